//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `EventRepository` - Events, with compare-and-set on `sold`
//! - `TicketRepository` - Tickets, with status-guarded updates
//! - `PaymentRepository` - Payments, looked up by external reference
//! - `UserDirectory` - Read-only registered users
//!
//! ## Collaborator Ports
//!
//! - `PaymentGateway` - Mobile-money collection requests
//! - `NotificationDispatcher` - Best-effort SMS
//! - `TicketCodeRenderer` - QR rendering of ticket codes
//! - `SessionValidator` - Bearer token validation

mod event_repository;
mod notification_dispatcher;
mod payment_gateway;
mod payment_repository;
mod session_validator;
mod ticket_code_renderer;
mod ticket_repository;
mod user_directory;
mod write_outcome;

pub use event_repository::EventRepository;
pub use notification_dispatcher::{NotificationDispatcher, NotificationError};
pub use payment_gateway::{CollectionHandle, GatewayError, PaymentGateway};
pub use payment_repository::PaymentRepository;
pub use session_validator::SessionValidator;
pub use ticket_code_renderer::{RenderError, RenderedImage, TicketCodeRenderer};
pub use ticket_repository::TicketRepository;
pub use user_directory::{UserDirectory, UserProfile};
pub use write_outcome::WriteOutcome;
