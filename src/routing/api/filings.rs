use crate::net::error;
use crate::sec::authn::Initiator;

pub mod itr;
pub mod gst;

/// transitions past the submit boundary, and any review action, are staff
/// only
fn require_staff(initiator: &Initiator) -> error::Result<()> {
    if initiator.user.is_staff() {
        Ok(())
    } else {
        Err(error::Error::api(error::AuthKind::PermissionDenied))
    }
}
