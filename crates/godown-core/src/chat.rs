use crate::classify::Classifier;
use crate::context::ContextBuilder;
use crate::orchestrator::ConsentOrchestrator;
use crate::types::{Confidence, Intent};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChatReply
// ---------------------------------------------------------------------------

/// The single externally observable surface of the conversational core.
/// View intents fill `context`; mutation and consent intents fill `reply`;
/// general chit-chat passes through with neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub intent: Intent,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    pub requires_consent: bool,
    pub success: bool,
}

// ---------------------------------------------------------------------------
// ChatPipeline
// ---------------------------------------------------------------------------

/// Full decision pipeline for one inbound message: classify, then route to
/// the consent orchestrator or the context builder.
pub struct ChatPipeline {
    classifier: Classifier,
    orchestrator: ConsentOrchestrator,
    context: ContextBuilder,
}

impl ChatPipeline {
    pub fn new(orchestrator: ConsentOrchestrator, context: ContextBuilder) -> Self {
        Self {
            classifier: Classifier::new(),
            orchestrator,
            context,
        }
    }

    pub async fn handle(&self, message: &str, user_id: &str) -> ChatReply {
        let classification = self.classifier.classify(message);
        let intent = classification.intent;
        let confidence = classification.confidence;
        tracing::debug!(user = user_id, %intent, %confidence, "message classified");

        match intent {
            Intent::ConfirmAction => {
                let outcome = self.orchestrator.execute(user_id).await;
                ChatReply {
                    intent,
                    confidence,
                    context: None,
                    reply: Some(outcome.message),
                    requires_consent: false,
                    success: outcome.success,
                }
            }
            Intent::RejectAction => {
                let outcome = self.orchestrator.reject(user_id);
                ChatReply {
                    intent,
                    confidence,
                    context: None,
                    reply: Some(outcome.message),
                    requires_consent: false,
                    success: outcome.success,
                }
            }
            _ if intent.is_mutation() => {
                let outcome = self.orchestrator.create(intent, message, user_id).await;
                ChatReply {
                    intent,
                    confidence,
                    context: None,
                    reply: Some(outcome.message),
                    requires_consent: outcome.requires_consent,
                    success: outcome.success,
                }
            }
            _ if intent.is_view() => match self.context.build(intent, user_id).await {
                Ok(context) => ChatReply {
                    intent,
                    confidence,
                    context,
                    reply: None,
                    requires_consent: false,
                    success: true,
                },
                Err(e) => {
                    tracing::warn!(user = user_id, error = %e, "context build failed");
                    ChatReply {
                        intent,
                        confidence,
                        context: None,
                        reply: Some(
                            "I couldn't fetch your data right now. Please try again."
                                .to_string(),
                        ),
                        requires_consent: false,
                        success: false,
                    }
                }
            },
            // General chit-chat is handled elsewhere; pass through untouched.
            _ => ChatReply {
                intent,
                confidence,
                context: None,
                reply: None,
                requires_consent: false,
                success: true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
