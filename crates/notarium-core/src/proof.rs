use crate::timestamp;
use crate::types::Proof;

/// Build a proof envelope stamped with the current time.
///
/// `verification_method` is normally the anchoring contract's address.
pub fn build_proof(proof_type: &str, verification_method: &str) -> Proof {
    Proof {
        proof_type: proof_type.to_string(),
        verification_method: verification_method.to_string(),
        created: timestamp::now(),
    }
}
