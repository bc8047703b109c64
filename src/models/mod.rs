pub mod booking;
pub mod email_log;
pub mod member;
pub mod notification;
pub mod package;
pub mod package_request;
pub mod report;
pub mod session;

pub use booking::{Booking, BookingCommit, BookingRequest, BookingStatus};
pub use email_log::{EmailLog, EmailStatus, NewEmail};
pub use member::{Member, MemberCredits};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use package::{CreditStatus, Package, PackageCredit};
pub use package_request::{NewPackageRequest, PackageRequest, PackageRequestFilter, RequestStatus};
pub use report::{BookingCounts, ReportSummary};
pub use session::{NewSession, Session, SessionStatus, SessionUpdate};
