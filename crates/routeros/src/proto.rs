//! RouterOS API wire format.
//!
//! The API speaks *sentences*: sequences of length-prefixed *words*
//! terminated by a zero-length word. Word lengths use a variable
//! 1-5 byte big-endian prefix where the high bits of the first byte
//! encode how many bytes follow.
//!
//! A command sentence starts with a path word (`/ip/hotspot/user/print`)
//! followed by attribute words (`=name=value`) and query words
//! (`?name=value`). Replies start with `!re` (one data record each),
//! and the exchange ends with `!done`; `!trap` and `!fatal` carry an
//! error with an optional `=message=` attribute.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest word this codec will read (1 MiB). RouterOS replies for
/// the hotspot paths are tiny; anything larger is a corrupt stream.
const MAX_WORD_LEN: u32 = 1024 * 1024;

/// Reply sentence category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `!re` — one data record with its attributes.
    Data(HashMap<String, String>),
    /// `!done` — end of command, with any trailing attributes.
    Done(HashMap<String, String>),
    /// `!trap` or `!fatal` — command failed.
    Trap { message: String },
}

/// Encode a word length into its variable-width prefix.
pub fn encode_length(len: u32, out: &mut Vec<u8>) {
    match len {
        0..=0x7F => out.push(len as u8),
        0x80..=0x3FFF => out.extend_from_slice(&(len | 0x8000).to_be_bytes()[2..]),
        0x4000..=0x1F_FFFF => out.extend_from_slice(&(len | 0x00C0_0000).to_be_bytes()[1..]),
        0x20_0000..=0x0FFF_FFFF => out.extend_from_slice(&(len | 0xE000_0000).to_be_bytes()),
        _ => {
            out.push(0xF0);
            out.extend_from_slice(&len.to_be_bytes());
        }
    }
}

/// Encode a full sentence (words + terminating empty word).
pub fn encode_sentence<S: AsRef<str>>(words: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for word in words {
        let bytes = word.as_ref().as_bytes();
        encode_length(bytes.len() as u32, &mut out);
        out.extend_from_slice(bytes);
    }
    out.push(0);
    out
}

/// Write a sentence to the stream.
pub async fn write_sentence<W, S>(writer: &mut W, words: &[S]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    S: AsRef<str>,
{
    writer.write_all(&encode_sentence(words)).await?;
    writer.flush().await
}

/// Read one variable-width word length from the stream.
pub async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<u32> {
    let first = reader.read_u8().await?;
    let len = if first < 0x80 {
        u32::from(first)
    } else if first & 0xC0 == 0x80 {
        (u32::from(first & 0x3F) << 8) | u32::from(reader.read_u8().await?)
    } else if first & 0xE0 == 0xC0 {
        let mut rest = [0u8; 2];
        reader.read_exact(&mut rest).await?;
        (u32::from(first & 0x1F) << 16) | (u32::from(rest[0]) << 8) | u32::from(rest[1])
    } else if first & 0xF0 == 0xE0 {
        let mut rest = [0u8; 3];
        reader.read_exact(&mut rest).await?;
        (u32::from(first & 0x0F) << 24)
            | (u32::from(rest[0]) << 16)
            | (u32::from(rest[1]) << 8)
            | u32::from(rest[2])
    } else {
        reader.read_u32().await?
    };

    if len > MAX_WORD_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("word length {len} exceeds limit"),
        ));
    }
    Ok(len)
}

/// Read one full sentence (until the terminating empty word).
pub async fn read_sentence<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Vec<String>> {
    let mut words = Vec::new();
    loop {
        let len = read_length(reader).await?;
        if len == 0 {
            return Ok(words);
        }
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await?;
        words.push(String::from_utf8_lossy(&buf).into_owned());
    }
}

/// Parse `=key=value` attribute words into a map.
///
/// Words without the attribute shape (including API attributes like
/// `.tag=x`, which this client never sets) are ignored.
pub fn parse_attributes(words: &[String]) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for word in words {
        if let Some(rest) = word.strip_prefix('=') {
            if let Some(eq) = rest.find('=') {
                attrs.insert(rest[..eq].to_string(), rest[eq + 1..].to_string());
            }
        }
    }
    attrs
}

/// Classify a reply sentence.
///
/// Returns `None` for sentences without a recognized category word
/// (the caller skips them).
pub fn classify_reply(words: &[String]) -> Option<Reply> {
    let first = words.first()?;
    match first.as_str() {
        "!re" => Some(Reply::Data(parse_attributes(&words[1..]))),
        "!done" => Some(Reply::Done(parse_attributes(&words[1..]))),
        "!trap" | "!fatal" => {
            let attrs = parse_attributes(&words[1..]);
            let message = attrs
                .get("message")
                .cloned()
                .unwrap_or_else(|| "unspecified router error".to_string());
            Some(Reply::Trap { message })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_len(len: u32) -> Vec<u8> {
        let mut out = Vec::new();
        encode_length(len, &mut out);
        out
    }

    #[test]
    fn short_lengths_are_one_byte() {
        assert_eq!(encoded_len(0), vec![0x00]);
        assert_eq!(encoded_len(0x7F), vec![0x7F]);
    }

    #[test]
    fn two_byte_lengths_set_high_bit() {
        assert_eq!(encoded_len(0x80), vec![0x80, 0x80]);
        assert_eq!(encoded_len(0x3FFF), vec![0xBF, 0xFF]);
    }

    #[test]
    fn three_byte_lengths() {
        assert_eq!(encoded_len(0x4000), vec![0xC0, 0x40, 0x00]);
        assert_eq!(encoded_len(0x1F_FFFF), vec![0xDF, 0xFF, 0xFF]);
    }

    #[test]
    fn four_byte_lengths() {
        assert_eq!(encoded_len(0x20_0000), vec![0xE0, 0x20, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn length_round_trips_through_decoder() {
        for len in [0u32, 1, 0x7F, 0x80, 0x1234, 0x3FFF, 0x4000, 0x12_3456] {
            let mut buf = Vec::new();
            encode_length(len, &mut buf);
            let mut cursor = std::io::Cursor::new(buf);
            assert_eq!(read_length(&mut cursor).await.unwrap(), len);
        }
    }

    #[tokio::test]
    async fn sentence_round_trip() {
        let words = ["/ip/hotspot/user/print", "?name=12345678900"];
        let encoded = encode_sentence(&words);
        let mut cursor = std::io::Cursor::new(encoded);
        let decoded = read_sentence(&mut cursor).await.unwrap();
        assert_eq!(decoded, words);
    }

    #[tokio::test]
    async fn oversized_word_is_rejected() {
        let mut buf = Vec::new();
        encode_length(MAX_WORD_LEN + 1, &mut buf);
        let mut cursor = std::io::Cursor::new(buf);
        assert!(read_length(&mut cursor).await.is_err());
    }

    #[test]
    fn attributes_parse_keys_and_values() {
        let words = vec![
            "=.id=*1A".to_string(),
            "=name=12345678900".to_string(),
            "=comment=captive-portal:12345678900".to_string(),
            ".tag=7".to_string(),
        ];
        let attrs = parse_attributes(&words);
        assert_eq!(attrs.get(".id").map(String::as_str), Some("*1A"));
        assert_eq!(attrs.get("name").map(String::as_str), Some("12345678900"));
        assert_eq!(attrs.len(), 3);
    }

    #[test]
    fn attribute_value_may_contain_equals() {
        let words = vec!["=comment=a=b".to_string()];
        let attrs = parse_attributes(&words);
        assert_eq!(attrs.get("comment").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn classify_replies() {
        let re = vec!["!re".to_string(), "=.id=*1".to_string()];
        assert!(matches!(classify_reply(&re), Some(Reply::Data(_))));

        let done = vec!["!done".to_string()];
        assert!(matches!(classify_reply(&done), Some(Reply::Done(_))));

        let trap = vec!["!trap".to_string(), "=message=no such item".to_string()];
        assert_eq!(
            classify_reply(&trap),
            Some(Reply::Trap {
                message: "no such item".to_string()
            })
        );

        assert_eq!(classify_reply(&[]), None);
    }
}
