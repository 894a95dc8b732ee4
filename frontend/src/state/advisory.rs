use shared::advisory::diagnosis_prompt;
use shared::error::ApiError;
use shared::{
    AdvisoryBundle, AdvisoryContent, AdvisoryRequest, ChatTurn, FollowUpAnswer, FollowUpRequest,
    Language,
};

pub const MAX_FOLLOW_UPS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryPhase {
    Loading,
    Ready(AdvisoryBundle),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Confirmed,
    Failed,
}

/// One line of the visible follow-up chat.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeEntry {
    Question { text: String, status: EntryStatus },
    Answer(FollowUpAnswer),
    Error(String),
}

/// A follow-up the session has accepted for sending. Hand it back to
/// [`AdvisorySession::complete_follow_up`] together with the result.
#[derive(Debug)]
pub struct FollowUpTicket {
    generation: u64,
    entry: usize,
    request: FollowUpRequest,
}

impl FollowUpTicket {
    pub fn request(&self) -> &FollowUpRequest {
        &self.request
    }
}

/// Advisory for one diagnosis plus the bounded follow-up chat about it.
///
/// `history` is what the backend sees as context; `exchange` is what the
/// user sees. Every accepted follow-up extends both.
#[derive(Debug)]
pub struct AdvisorySession {
    request: AdvisoryRequest,
    phase: AdvisoryPhase,
    language: Language,
    history: Vec<ChatTurn>,
    exchange: Vec<ExchangeEntry>,
    accepted: usize,
    in_flight: bool,
    generation: u64,
}

impl AdvisorySession {
    pub fn new(request: AdvisoryRequest) -> Self {
        Self {
            request,
            phase: AdvisoryPhase::Loading,
            language: Language::default(),
            history: Vec::new(),
            exchange: Vec::new(),
            accepted: 0,
            in_flight: false,
            generation: 0,
        }
    }

    /// Starts over for another diagnosis. Advisories and answers issued
    /// for earlier generations are dropped when they arrive.
    pub fn restart(&mut self, request: AdvisoryRequest) {
        let generation = self.generation + 1;
        *self = Self::new(request);
        self.generation = generation;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &AdvisoryRequest {
        &self.request
    }

    pub fn advisory_loaded(&mut self, generation: u64, result: Result<AdvisoryBundle, ApiError>) {
        if generation != self.generation {
            log::debug!("Dropping advisory from generation {}", generation);
            return;
        }
        if !matches!(self.phase, AdvisoryPhase::Loading) {
            log::debug!("Advisory for {} already settled", self.request.disease);
            return;
        }

        let seeded = result.and_then(|bundle| {
            self.seed_history(&bundle)?;
            Ok(bundle)
        });

        self.phase = match seeded {
            Ok(bundle) => {
                log::info!("Advisory ready for {}", self.request.disease);
                AdvisoryPhase::Ready(bundle)
            }
            Err(err) => {
                log::error!("Advisory for {} failed: {}", self.request.disease, err);
                AdvisoryPhase::Failed(err.to_string())
            }
        };
    }

    fn seed_history(&mut self, bundle: &AdvisoryBundle) -> Result<(), ApiError> {
        let advisory_json =
            serde_json::to_string(bundle).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.history = vec![
            ChatTurn::user(diagnosis_prompt(&self.request)),
            ChatTurn::model(advisory_json),
        ];
        Ok(())
    }

    /// Queues a question. Returns `None`, changing nothing, when the
    /// question is blank, the advisory is not ready, another follow-up is
    /// still pending, or the cap is reached.
    pub fn begin_follow_up(&mut self, question: &str) -> Option<FollowUpTicket> {
        let question = question.trim();
        if question.is_empty() || !self.can_ask() {
            return None;
        }

        self.in_flight = true;
        self.exchange.push(ExchangeEntry::Question {
            text: question.to_string(),
            status: EntryStatus::Pending,
        });

        Some(FollowUpTicket {
            generation: self.generation,
            entry: self.exchange.len() - 1,
            request: FollowUpRequest {
                history: self.history.clone(),
                question: question.to_string(),
            },
        })
    }

    pub fn complete_follow_up(
        &mut self,
        ticket: FollowUpTicket,
        result: Result<FollowUpAnswer, ApiError>,
    ) {
        let FollowUpTicket {
            generation,
            entry,
            request,
        } = ticket;
        if generation != self.generation {
            log::debug!("Dropping follow-up answer from generation {}", generation);
            return;
        }
        self.in_flight = false;

        let outcome = result.and_then(|answer| {
            let answer_json =
                serde_json::to_string(&answer).map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok((answer, answer_json))
        });

        match outcome {
            Ok((answer, answer_json)) => {
                self.set_entry_status(entry, EntryStatus::Confirmed);
                self.history.push(ChatTurn::user(request.question));
                self.history.push(ChatTurn::model(answer_json));
                self.exchange.push(ExchangeEntry::Answer(answer));
                self.accepted += 1;
                log::info!("Follow-up {}/{} answered", self.accepted, MAX_FOLLOW_UPS);
            }
            Err(err) => {
                log::warn!("Follow-up failed: {}", err);
                self.set_entry_status(entry, EntryStatus::Failed);
                self.exchange.push(ExchangeEntry::Error(err.to_string()));
            }
        }
    }

    fn set_entry_status(&mut self, index: usize, new_status: EntryStatus) {
        if let Some(ExchangeEntry::Question { status, .. }) = self.exchange.get_mut(index) {
            *status = new_status;
        }
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn phase(&self) -> &AdvisoryPhase {
        &self.phase
    }

    /// Advisory text in the selected language, if the bundle has it.
    pub fn content(&self) -> Option<&AdvisoryContent> {
        match &self.phase {
            AdvisoryPhase::Ready(bundle) => bundle.content(self.language),
            _ => None,
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn exchange(&self) -> &[ExchangeEntry] {
        &self.exchange
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn remaining(&self) -> usize {
        MAX_FOLLOW_UPS.saturating_sub(self.accepted)
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.in_flight
    }

    pub fn limit_reached(&self) -> bool {
        self.accepted >= MAX_FOLLOW_UPS
    }

    pub fn can_ask(&self) -> bool {
        matches!(self.phase, AdvisoryPhase::Ready(_)) && !self.in_flight && !self.limit_reached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ChatRole;

    fn bundle() -> AdvisoryBundle {
        serde_json::from_str(
            r#"{
                "english": {
                    "summary": "Late blight thrives in cool, wet weather.",
                    "commercial_remedy": {"product": "Mancozeb 75 WP", "dosage": "2.5 g/L", "frequency": "Every 7 days"},
                    "traditional_remedy": {"recipe": "Garlic-chili spray", "frequency": "Every 5 days", "notes": "Spray in the evening."}
                },
                "hindi": {"summary": "पछेती झुलसा ठंडे, गीले मौसम में फैलता है।"}
            }"#,
        )
        .unwrap()
    }

    fn answer(text: &str) -> FollowUpAnswer {
        FollowUpAnswer::bilingual(text, format!("[hi] {}", text))
    }

    fn ready_session() -> AdvisorySession {
        let mut session =
            AdvisorySession::new(AdvisoryRequest::new("Tomato___Late_blight", 0.93, 62.4));
        session.advisory_loaded(session.generation(), Ok(bundle()));
        session
    }

    #[test]
    fn loaded_advisory_seeds_two_history_turns() {
        let session = ready_session();
        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(
            history[0].content,
            "Disease: Tomato___Late_blight, Confidence: 93.0%, Severity: 62.4%"
        );
        assert_eq!(history[1].role, ChatRole::Model);
        let echoed: AdvisoryBundle = serde_json::from_str(&history[1].content).unwrap();
        assert_eq!(echoed, bundle());
        assert!(session.can_ask());
    }

    #[test]
    fn failed_advisory_is_terminal() {
        let mut session = AdvisorySession::new(AdvisoryRequest::new("Apple___Black_rot", 0.7, 10.0));
        session.advisory_loaded(session.generation(), Err(ApiError::Advisory { status: 502 }));
        assert_eq!(session.phase(), &AdvisoryPhase::Failed("Advisory failed: 502".into()));
        assert!(session.history().is_empty());
        assert!(!session.can_ask());
        assert!(session.begin_follow_up("What now?").is_none());

        // A late success does not resurrect it.
        session.advisory_loaded(session.generation(), Ok(bundle()));
        assert!(matches!(session.phase(), AdvisoryPhase::Failed(_)));
    }

    #[test]
    fn no_follow_up_before_advisory_arrives() {
        let mut session = AdvisorySession::new(AdvisoryRequest::new("Apple___Black_rot", 0.7, 10.0));
        assert!(session.begin_follow_up("Is it contagious?").is_none());
        assert!(session.exchange().is_empty());
    }

    #[test]
    fn blank_questions_are_ignored() {
        let mut session = ready_session();
        assert!(session.begin_follow_up("").is_none());
        assert!(session.begin_follow_up("   \n\t").is_none());
        assert!(session.exchange().is_empty());
        assert!(!session.is_awaiting_answer());
    }

    #[test]
    fn successful_follow_up_extends_history_and_exchange() {
        let mut session = ready_session();
        let ticket = session.begin_follow_up("  How often should I spray?  ").unwrap();

        assert_eq!(ticket.request().question, "How often should I spray?");
        assert_eq!(ticket.request().history, session.history().to_vec());
        assert_eq!(
            session.exchange(),
            &[ExchangeEntry::Question {
                text: "How often should I spray?".into(),
                status: EntryStatus::Pending
            }]
        );
        assert!(session.is_awaiting_answer());

        session.complete_follow_up(ticket, Ok(answer("Every 7 days.")));

        assert_eq!(session.history().len(), 4);
        assert_eq!(session.history()[2], ChatTurn::user("How often should I spray?"));
        assert_eq!(session.history()[3].role, ChatRole::Model);
        let echoed: FollowUpAnswer = serde_json::from_str(&session.history()[3].content).unwrap();
        assert_eq!(echoed, answer("Every 7 days."));

        assert_eq!(session.exchange().len(), 2);
        assert!(matches!(
            session.exchange()[0],
            ExchangeEntry::Question { status: EntryStatus::Confirmed, .. }
        ));
        assert_eq!(session.exchange()[1], ExchangeEntry::Answer(answer("Every 7 days.")));
        assert_eq!(session.accepted(), 1);
        assert_eq!(session.remaining(), 1);
        assert!(!session.is_awaiting_answer());
    }

    #[test]
    fn second_question_waits_for_the_first() {
        let mut session = ready_session();
        let first = session.begin_follow_up("First?").unwrap();
        assert!(session.begin_follow_up("Second?").is_none());
        assert_eq!(session.exchange().len(), 1);

        session.complete_follow_up(first, Ok(answer("Yes.")));
        let second = session.begin_follow_up("Second?").unwrap();
        // Context for the second question includes the first exchange.
        assert_eq!(second.request().history.len(), 4);
    }

    #[test]
    fn failed_follow_up_does_not_consume_a_slot() {
        let mut session = ready_session();
        let ticket = session.begin_follow_up("Is it safe for pets?").unwrap();
        session.complete_follow_up(ticket, Err(ApiError::FollowUp { status: 500 }));

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.accepted(), 0);
        assert_eq!(
            session.exchange(),
            &[
                ExchangeEntry::Question {
                    text: "Is it safe for pets?".into(),
                    status: EntryStatus::Failed
                },
                ExchangeEntry::Error("Follow-up failed: 500".into()),
            ]
        );
        assert!(session.can_ask());
    }

    #[test]
    fn rate_limit_message_is_shown_verbatim() {
        let mut session = ready_session();
        let ticket = session.begin_follow_up("One more?").unwrap();
        session.complete_follow_up(
            ticket,
            Err(ApiError::RateLimit {
                message: "Follow-up limit reached.".into(),
            }),
        );
        assert_eq!(
            session.exchange().last(),
            Some(&ExchangeEntry::Error("Follow-up limit reached.".into()))
        );
    }

    #[test]
    fn cap_holds_regardless_of_attempts() {
        let mut session = ready_session();

        for round in 0..6 {
            let Some(ticket) = session.begin_follow_up(&format!("Question {}", round)) else {
                continue;
            };
            // Every other attempt fails; failures never count.
            if round % 2 == 0 {
                session.complete_follow_up(ticket, Err(ApiError::Network));
            } else {
                session.complete_follow_up(ticket, Ok(answer("ok")));
            }
            assert!(session.accepted() <= MAX_FOLLOW_UPS);
        }

        assert_eq!(session.accepted(), MAX_FOLLOW_UPS);
        assert!(session.limit_reached());
        assert_eq!(session.history().len(), 2 + 2 * MAX_FOLLOW_UPS);

        let before = session.exchange().len();
        assert!(session.begin_follow_up("A third question").is_none());
        assert_eq!(session.exchange().len(), before);
        assert!(!session.can_ask());
    }

    #[test]
    fn language_switch_is_view_only() {
        let mut session = ready_session();
        assert_eq!(
            session.content().map(|c| c.summary.as_str()),
            Some("Late blight thrives in cool, wet weather.")
        );

        session.set_language(Language::Hindi);
        let hindi = session.content().unwrap();
        assert!(hindi.commercial_remedy.is_none());
        assert_eq!(session.history().len(), 2);
        assert!(session.exchange().is_empty());
    }

    #[test]
    fn missing_language_section_renders_nothing() {
        let mut session = AdvisorySession::new(AdvisoryRequest::new("Grape___Black_rot", 0.6, 40.0));
        session.advisory_loaded(session.generation(), Ok(AdvisoryBundle {
            english: bundle().english,
            hindi: None,
        }));
        session.set_language(Language::Hindi);
        assert!(session.content().is_none());
        assert!(session.can_ask());
    }

    #[test]
    fn restart_drops_results_for_the_previous_diagnosis() {
        let mut session = ready_session();
        let old_generation = session.generation();
        let ticket = session.begin_follow_up("Is it contagious?").unwrap();

        session.restart(AdvisoryRequest::new("Potato___Early_blight", 0.81, 35.0));
        assert_ne!(session.generation(), old_generation);
        assert_eq!(session.phase(), &AdvisoryPhase::Loading);

        session.advisory_loaded(old_generation, Ok(bundle()));
        assert_eq!(session.phase(), &AdvisoryPhase::Loading);

        session.complete_follow_up(ticket, Ok(answer("Yes.")));
        assert!(session.history().is_empty());
        assert!(session.exchange().is_empty());
        assert_eq!(session.accepted(), 0);

        session.advisory_loaded(session.generation(), Ok(bundle()));
        assert!(session.history()[0].content.starts_with("Disease: Potato___Early_blight"));
        assert!(session.can_ask());
    }

    #[test]
    fn plain_text_answer_is_accepted_and_echoed() {
        let mut session = ready_session();
        let ticket = session.begin_follow_up("How often?").unwrap();
        let reply: FollowUpAnswer = serde_json::from_str(r#""Spray weekly""#).unwrap();

        session.complete_follow_up(ticket, Ok(reply));

        assert_eq!(session.accepted(), 1);
        assert_eq!(session.history()[3].content, r#""Spray weekly""#);
        match &session.exchange()[1] {
            ExchangeEntry::Answer(answer) => assert_eq!(answer.text(Language::Hindi), "Spray weekly"),
            other => panic!("expected an answer, got {:?}", other),
        }
    }
}
