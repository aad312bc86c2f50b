//! Customer/stylist messaging

use luxe_core::types::{Conversation, Message};

use super::{ClientError, LuxeClient};
use crate::types::{ConversationList, MessageList, SendMessageRequest, StartConversationRequest, UnreadCount};

impl LuxeClient {
    pub async fn conversations(&self) -> Result<ConversationList, ClientError> {
        self.get("/messages").await
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<MessageList, ClientError> {
        self.get(&format!("/messages/{conversation_id}/messages"))
            .await
    }

    pub async fn start_conversation(
        &self,
        request: &StartConversationRequest,
    ) -> Result<Conversation, ClientError> {
        self.post("/messages", request).await
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<Message, ClientError> {
        let request = SendMessageRequest {
            text: text.to_string(),
        };
        self.post(&format!("/messages/{conversation_id}/messages"), &request)
            .await
    }

    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        let count: UnreadCount = self.get("/messages/unread").await?;
        Ok(count.unread_count)
    }
}
