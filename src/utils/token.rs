use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const SHARE_TOKEN_LEN: usize = 24;

/// Random URL-safe token a job is shared with candidates under.
pub fn generate_share_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_TOKEN_LEN)
        .map(char::from)
        .collect()
}
