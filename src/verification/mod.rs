/// Verification module - Device fingerprint, transport, retry and result mapping
pub mod fingerprint;
pub mod network;
pub mod result;
pub mod retry;

pub use fingerprint::{
    get_machine_fingerprint, FingerprintSource, FixedFingerprint, HostFingerprint,
    FINGERPRINT_SENTINEL,
};
pub use network::{
    shared_transport, shutdown_shared_transport, HttpResponse, ReqwestTransport, Transport,
};
pub use result::{ResultStatus, ServerResponse, ServerUser, ValidationResult};
pub use retry::{CancelToken, RetryPolicy, Sleeper, ThreadSleeper};
