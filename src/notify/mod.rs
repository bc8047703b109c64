//! Best-effort side effects of committed writes.
//!
//! Bookings write their confirmation email into the `email_logs` outbox
//! inside the booking transaction; [`EmailDispatcher`] delivers it later,
//! so a mail failure can never undo a booking.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{DrainReport, EmailDispatcher, OutboxSignal};
pub use mailer::{LogMailer, Mailer};
