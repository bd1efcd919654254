//! Stripe payments adapter.

use async_trait::async_trait;
use opsflow_credentials::{CredentialName, Credentials, Service};
use opsflow_tools::{DataType, InputConstraints, OutputSpec, ToolInput, ToolOutput, ToolSpec};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumIter;
use tracing::{debug, info};

use crate::adapter::{
    ActionReport, OperationInfo, ServiceAdapter, join_url, parse_input, send, send_json, to_output,
};
use crate::demo;
use crate::error::{AdapterError, Result};
use crate::normalize::{epoch_to_date, minor_to_major};

/// Operations exposed by [`StripeAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StripeOperation {
    GetCustomer,
    ListPayments,
    RefundPayment,
}

/// A normalized customer. `balance` is in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created: String,
    pub balance: f64,
}

/// A normalized payment intent. `amount` is in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub created: String,
}

#[derive(Debug, Deserialize)]
struct CustomerInput {
    email: String,
}

#[derive(Debug, Deserialize)]
struct PaymentsInput {
    customer_id: String,
}

#[derive(Debug, Deserialize)]
struct RefundInput {
    payment_intent_id: String,
}

/// Stripe list envelope.
#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    email: Option<String>,
    name: Option<String>,
    created: i64,
    #[serde(default)]
    balance: i64,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    created: i64,
}

/// Stripe payments adapter.
pub struct StripeAdapter {
    /// Secret key.
    key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl StripeAdapter {
    /// Create an adapter using the Stripe credential from `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            key: credentials.get(CredentialName::Stripe).map(str::to_string),
            base_url: "https://api.stripe.com".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Share an HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let key = self
            .key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(CredentialName::Stripe))?;

        Ok(self
            .client
            .request(method, join_url(&self.base_url, path))
            .bearer_auth(key))
    }

    /// Find the first customer with the given email.
    async fn get_customer(&self, input: CustomerInput) -> Result<Customer> {
        let email = input.email;
        debug!("Searching Stripe customers for {email}");

        let query = format!("email:\"{email}\"");
        let request = self
            .request(Method::GET, "v1/customers/search")?
            .query(&[("query", query.as_str())]);
        let list: StripeList<StripeCustomer> =
            send_json(request, "Failed to search customers").await?;

        let customer = list
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::NotFound("No customer found with that email".to_string()))?;

        Ok(Customer {
            id: customer.id,
            email: customer.email.unwrap_or(email),
            name: customer.name,
            created: epoch_to_date(customer.created)?,
            balance: minor_to_major(customer.balance),
        })
    }

    async fn list_payments(&self, input: PaymentsInput) -> Result<Vec<Payment>> {
        let customer_id = input.customer_id;
        let request = self
            .request(Method::GET, "v1/payment_intents")?
            .query(&[("customer", customer_id.as_str()), ("limit", "10")]);
        let list: StripeList<StripePaymentIntent> =
            send_json(request, "Failed to fetch payments").await?;

        let payments = list
            .data
            .into_iter()
            .map(|intent| {
                Ok(Payment {
                    id: intent.id,
                    amount: minor_to_major(intent.amount),
                    currency: intent.currency.to_uppercase(),
                    status: intent.status,
                    created: epoch_to_date(intent.created)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Fetched {} payments for {customer_id}", payments.len());
        Ok(payments)
    }

    async fn refund_payment(&self, input: RefundInput) -> Result<ActionReport> {
        let request = self
            .request(Method::POST, "v1/refunds")?
            .form(&[("payment_intent", input.payment_intent_id.as_str())]);
        send(request, "Failed to process refund").await?;

        info!("Refunded payment {}", input.payment_intent_id);
        Ok(ActionReport::done("Refund processed successfully"))
    }
}

#[async_trait]
impl ServiceAdapter for StripeAdapter {
    type Operation = StripeOperation;

    fn service(&self) -> Service {
        Service::Stripe
    }

    fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    fn describe(&self, operation: StripeOperation) -> OperationInfo {
        match operation {
            StripeOperation::GetCustomer => OperationInfo {
                name: "get_stripe_customer",
                description: "Find a Stripe customer by email",
                spec: ToolSpec::new()
                    .with_input(
                        ToolInput::required("email", DataType::String, "Customer email address")
                            .with_constraints(InputConstraints::email()),
                    )
                    .with_output(OutputSpec::object(vec![
                        ToolOutput::new("id", DataType::String, "Customer ID"),
                        ToolOutput::new("email", DataType::String, "Email address"),
                        ToolOutput::new("name", DataType::String, "Full name").nullable(),
                        ToolOutput::new("created", DataType::String, "Signup date"),
                        ToolOutput::new("balance", DataType::Number, "Account balance"),
                    ])),
                mutating: false,
            },
            StripeOperation::ListPayments => OperationInfo {
                name: "list_stripe_payments",
                description: "List recent payments for a customer",
                spec: ToolSpec::new()
                    .with_input(ToolInput::required(
                        "customer_id",
                        DataType::String,
                        "Stripe customer ID",
                    ))
                    .with_output(OutputSpec::list(vec![
                        ToolOutput::new("id", DataType::String, "Payment intent ID"),
                        ToolOutput::new("amount", DataType::Number, "Amount"),
                        ToolOutput::new("currency", DataType::String, "ISO currency code"),
                        ToolOutput::new("status", DataType::String, "Payment status"),
                        ToolOutput::new("created", DataType::String, "Payment date"),
                    ])),
                mutating: false,
            },
            StripeOperation::RefundPayment => OperationInfo {
                name: "refund_stripe_payment",
                description: "Refund a Stripe payment",
                spec: ToolSpec::new()
                    .with_input(ToolInput::required(
                        "payment_intent_id",
                        DataType::String,
                        "Payment Intent ID to refund",
                    ))
                    .with_output(ActionReport::output_spec()),
                mutating: true,
            },
        }
    }

    async fn invoke(&self, operation: StripeOperation, input: Value) -> Result<Value> {
        match operation {
            StripeOperation::GetCustomer => to_output(&self.get_customer(parse_input(input)?).await?),
            StripeOperation::ListPayments => {
                to_output(&self.list_payments(parse_input(input)?).await?)
            }
            StripeOperation::RefundPayment => {
                to_output(&self.refund_payment(parse_input(input)?).await?)
            }
        }
    }

    fn demo(&self, operation: StripeOperation, input: &Value) -> Result<Value> {
        match operation {
            StripeOperation::GetCustomer => to_output(&demo::stripe_customer()),
            StripeOperation::ListPayments => to_output(&demo::stripe_payments()),
            StripeOperation::RefundPayment => {
                let input: RefundInput = parse_input(input.clone())?;
                to_output(&ActionReport::demo(format!(
                    "payment {} would be refunded",
                    input.payment_intent_id
                )))
            }
        }
    }
}
