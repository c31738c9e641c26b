//! USSD dialog handling.

mod handle_ussd_request;

pub use handle_ussd_request::{
    HandleUssdRequestCommand, HandleUssdRequestHandler, HandleUssdRequestResult, UssdSettings,
};
