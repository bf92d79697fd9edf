//! Challenge-response login hash.
//!
//! UrBackup never sends the plain password over the wire. The server
//! issues a per-user salt, an optional PBKDF2 round count, and a random
//! per-session seed; the client answers with a digest bound to all three.
//! The composition must match the server bit-for-bit:
//!
//! 1. `stage1 = MD5(salt || password)` (raw 16 bytes, not hex)
//! 2. rounds > 0: `dk = PBKDF2-HMAC-SHA256(stage1, salt, rounds, 32)`,
//!    answer `= hex(MD5(seed || hex(dk)))`
//! 3. rounds == 0: answer `= hex(MD5(seed || stage1))`
//!
//! The rounds==0 branch exists because the server's PBKDF2 cost factor is
//! configurable down to off; both branches are live in the field.

/// Derived key length of the PBKDF2 stage (bytes).
const PBKDF2_KEY_LEN: usize = 32;

/// Compute the one-time login hash for a credentialed handshake.
///
/// Pure function of its inputs; no error paths.
pub fn session_login_hash(password: &str, salt: &str, rounds: u32, session_seed: &str) -> String {
    let mut salted = Vec::with_capacity(salt.len() + password.len());
    salted.extend_from_slice(salt.as_bytes());
    salted.extend_from_slice(password.as_bytes());
    let stage1 = md5::compute(&salted);

    let mut seeded = Vec::with_capacity(session_seed.len() + PBKDF2_KEY_LEN * 2);
    seeded.extend_from_slice(session_seed.as_bytes());

    if rounds > 0 {
        let mut dk = [0u8; PBKDF2_KEY_LEN];
        pbkdf2::pbkdf2_hmac::<sha2::Sha256>(stage1.as_ref(), salt.as_bytes(), rounds, &mut dk);
        seeded.extend_from_slice(hex::encode(dk).as_bytes());
    } else {
        seeded.extend_from_slice(stage1.as_ref());
    }

    format!("{:x}", md5::compute(&seeded))
}
