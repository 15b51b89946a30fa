use getrandom::getrandom;

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(format!("{kind} must not contain path separators"));
    }
    Ok(())
}

/// Random RFC 4122 version 4 identifier, used for JSON-RPC request ids.
pub fn new_request_id() -> Result<String, String> {
    let mut bytes = [0_u8; 16];
    getrandom(&mut bytes).map_err(|err| format!("failed to generate request id: {err}"))?;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
