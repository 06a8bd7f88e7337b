use crate::models::api::ConversationId;
use log::{ info, warn };

/// Holds the conversation identifier for one controller lifetime.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    conversation_id: Option<ConversationId>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(id: ConversationId) -> Self {
        Self { conversation_id: Some(id) }
    }

    pub fn get(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Last identifier returned by the server wins.
    pub fn set(&mut self, id: ConversationId) {
        match &self.conversation_id {
            Some(previous) if *previous != id => {
                warn!("Replacing conversation {} with {}", previous, id);
            }
            Some(_) => {}
            None => info!("Conversation started: {}", id),
        }
        self.conversation_id = Some(id);
    }

    pub fn has_conversation(&self) -> bool {
        self.conversation_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_sets_once() {
        let mut session = SessionState::new();
        assert!(session.get().is_none());
        assert!(!session.has_conversation());

        session.set(ConversationId::new("c1"));
        assert_eq!(session.get().map(|id| id.as_str()), Some("c1"));
    }

    #[test]
    fn later_set_overwrites() {
        let mut session = SessionState::seeded(ConversationId::new("old"));
        session.set(ConversationId::new("new"));
        assert_eq!(session.get(), Some(&ConversationId::new("new")));
    }
}
