pub mod checks;
pub mod report;
pub mod runner;
pub mod scenario;

pub use crate::domain::model::{
    AuthResponse, Credentials, Order, Profile, ReferralCode, Registration, SessionToken,
};
pub use crate::domain::ports::{BackendApi, DatabaseProbe, ProbeMethod, ProbeOutcome};
pub use crate::utils::error::Result;
