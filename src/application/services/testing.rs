//! In-memory fakes for the third-party ports, plus database fixtures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::billing::PlanType;
use crate::domain::ports::{
    AiError, AiPart, AiProvider, AiReply, AiTask, CheckoutPreference, CheckoutRequest,
    MessagingGateway, OutboundMessage, PaymentGateway, PaymentInfo,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::database::testing::{seed_user, setup_db};
use crate::infrastructure::SeaOrmRepositoryProvider;

pub async fn repos() -> (DatabaseConnection, Arc<dyn RepositoryProvider>) {
    let db = setup_db().await;
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    (db, repos)
}

pub async fn user(db: &DatabaseConnection, email: &str, plan: PlanType) -> i32 {
    seed_user(db, email, plan).await
}

// ── AI ──────────────────────────────────────────────────────────

/// Replies are consumed in order; `Err` strings become API errors.
pub struct FakeAi {
    pub has_key: bool,
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub calls: Mutex<Vec<(AiTask, Vec<AiPart>)>>,
}

impl FakeAi {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            has_key: true,
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn without_key() -> Self {
        Self {
            has_key: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn prompt_text(&self, call: usize) -> String {
        let calls = self.calls.lock().unwrap();
        calls[call]
            .1
            .iter()
            .filter_map(|p| match p {
                AiPart::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl AiProvider for FakeAi {
    fn has_key(&self) -> bool {
        self.has_key
    }

    fn candidates(&self, task: AiTask) -> Vec<String> {
        vec![task.default_model().to_string()]
    }

    async fn generate(&self, task: AiTask, parts: Vec<AiPart>) -> Result<AiReply, AiError> {
        if !self.has_key {
            return Err(AiError::MissingKey);
        }
        self.calls.lock().unwrap().push((task, parts));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(AiReply {
                text,
                model: task.default_model().to_string(),
            }),
            Some(Err(message)) => Err(AiError::Api { status: 500, message }),
            None => Err(AiError::EmptyResponse),
        }
    }
}

// ── Payments ────────────────────────────────────────────────────

pub struct FakePayments {
    pub configured: bool,
    pub payment: Mutex<Option<PaymentInfo>>,
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

impl FakePayments {
    pub fn new() -> Self {
        Self {
            configured: true,
            payment: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_payment(payment: PaymentInfo) -> Self {
        let fake = Self::new();
        *fake.payment.lock().unwrap() = Some(payment);
        fake
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_preference(&self, request: CheckoutRequest) -> DomainResult<CheckoutPreference> {
        let id = format!("pref-{}", self.requests.lock().unwrap().len() + 1);
        self.requests.lock().unwrap().push(request);
        Ok(CheckoutPreference {
            init_point: Some(format!("https://mp.test/checkout/{id}")),
            sandbox_init_point: None,
            id,
        })
    }

    async fn get_payment(&self, payment_id: &str) -> DomainResult<PaymentInfo> {
        self.payment
            .lock()
            .unwrap()
            .clone()
            .filter(|p| p.id == payment_id)
            .ok_or_else(|| DomainError::Integration {
                code: "MERCADO_PAGO_ERROR",
                message: "payment not found".into(),
            })
    }
}

// ── Messaging ───────────────────────────────────────────────────

pub struct FakeMessaging {
    pub configured: bool,
    pub fail_with: Option<String>,
    pub sent: Mutex<Vec<OutboundMessage>>,
}

impl FakeMessaging {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MessagingGateway for FakeMessaging {
    fn missing_config(&self) -> Vec<&'static str> {
        if self.configured {
            Vec::new()
        } else {
            vec!["WHATSAPP_API_TOKEN"]
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, message: OutboundMessage) -> DomainResult<String> {
        if let Some(error) = &self.fail_with {
            return Err(DomainError::Integration {
                code: "WHATSAPP_SEND_FAILED",
                message: error.clone(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("wamid.{}", sent.len()))
    }
}
