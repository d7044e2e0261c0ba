use crate::Error;

/// Parse an all-hardened derivation path (`m/44'/501'/0'/0'`) into its raw indices, each with the
/// hardened bit already set. SLIP-0010 ed25519 derivation only ever takes hardened steps.
pub fn parse_hardened_components(path: &str) -> Result<Vec<u32>, Error> {
    let rest = path
        .strip_prefix("m/")
        .ok_or_else(|| Error::InvalidDerivationPath(path.to_string()))?;

    rest.split('/')
        .map(|segment| {
            let stripped = segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
                .ok_or_else(|| Error::InvalidDerivationPath(path.to_string()))?;
            let index: u32 = stripped
                .parse()
                .map_err(|_| Error::InvalidDerivationPath(path.to_string()))?;
            Ok(index | 0x8000_0000)
        })
        .collect()
}

/// Replace the last segment of a registered path with a freshly hardened index, as required
/// when deriving batch `i ∈ [0, num)` addresses for ed25519 coins.
pub fn replace_last_segment(path: &str, index: u32) -> String {
    match path.rfind('/') {
        Some(pos) => format!("{}/{}'", &path[..pos], index),
        None => format!("{}'", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_hardened() {
        let components = parse_hardened_components("m/44'/501'/0'/0'").unwrap();
        assert_eq!(components, vec![0x8000_002c, 0x800001f5, 0x8000_0000, 0x8000_0000]);
    }

    #[test]
    fn rejects_non_hardened_segment() {
        assert!(parse_hardened_components("m/44'/501'/0/0'").is_err());
    }

    #[test]
    fn replaces_last_segment() {
        assert_eq!(replace_last_segment("m/44'/501'/0'/0'", 7), "m/44'/501'/0'/7'");
    }
}
