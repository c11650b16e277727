/// What the delivery controller should do with an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx: the batch was accepted.
    Success,
    /// 429 or 5xx: transient backend overload, retry with backoff.
    Retry,
    /// 413: payload too large, split the batch and resubmit the halves.
    Split,
    /// Malformed or unauthorized request; retrying cannot help.
    Rejected,
    /// A status the protocol does not account for. Terminal.
    Unexpected,
}

pub fn classify(status: u16) -> Disposition {
    match status {
        200..=299 => Disposition::Success,
        413 => Disposition::Split,
        429 => Disposition::Retry,
        400 | 401 | 403 | 404 | 405 => Disposition::Rejected,
        500..=599 => Disposition::Retry,
        _ => Disposition::Unexpected,
    }
}
