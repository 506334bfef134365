//! ICY (Shoutcast/Icecast) in-band metadata de-interleaving
//!
//! With `Icy-MetaData: 1` the server inserts a metadata block after every
//! `icy-metaint` audio bytes: one length byte (×16) followed by that many
//! bytes of `key='value';` pairs, NUL padded.

/// Output of feeding one network chunk through the parser
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IcyChunk {
    /// Audio payload with metadata blocks removed
    pub audio: Vec<u8>,
    /// `StreamTitle` values found in this chunk, in stream order
    pub titles: Vec<String>,
}

#[derive(Debug)]
enum State {
    Audio { remaining: usize },
    Length,
    Meta { remaining: usize, block: Vec<u8> },
}

/// Incremental ICY metadata parser
#[derive(Debug)]
pub struct IcyParser {
    metaint: Option<usize>,
    state: State,
}

impl IcyParser {
    /// `metaint` of `None` (or zero) means the stream has no in-band metadata
    pub fn new(metaint: Option<usize>) -> Self {
        let metaint = metaint.filter(|m| *m > 0);
        Self {
            metaint,
            state: State::Audio {
                remaining: metaint.unwrap_or(0),
            },
        }
    }

    /// Feed bytes from the network
    pub fn push(&mut self, mut data: &[u8]) -> IcyChunk {
        let mut out = IcyChunk::default();
        let Some(metaint) = self.metaint else {
            out.audio.extend_from_slice(data);
            return out;
        };

        while !data.is_empty() {
            match &mut self.state {
                State::Audio { remaining } => {
                    let take = (*remaining).min(data.len());
                    out.audio.extend_from_slice(&data[..take]);
                    data = &data[take..];
                    *remaining -= take;
                    if *remaining == 0 {
                        self.state = State::Length;
                    }
                }
                State::Length => {
                    let len = data[0] as usize * 16;
                    data = &data[1..];
                    self.state = if len == 0 {
                        State::Audio { remaining: metaint }
                    } else {
                        State::Meta {
                            remaining: len,
                            block: Vec::with_capacity(len),
                        }
                    };
                }
                State::Meta { remaining, block } => {
                    let take = (*remaining).min(data.len());
                    block.extend_from_slice(&data[..take]);
                    data = &data[take..];
                    *remaining -= take;
                    if *remaining == 0 {
                        if let Some(title) = extract_stream_title(block) {
                            out.titles.push(title);
                        }
                        self.state = State::Audio { remaining: metaint };
                    }
                }
            }
        }
        out
    }
}

/// Extract `StreamTitle='...'` from a metadata block
pub fn extract_stream_title(block: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(block);
    let text = text.trim_end_matches('\0');
    let start = text.find("StreamTitle='")? + "StreamTitle='".len();
    let rest = &text[start..];
    // Titles may contain apostrophes; the value ends at the `';` that is
    // followed by the end of the block or by the next `key='`.
    let end = rest
        .match_indices("';")
        .map(|(i, _)| i)
        .find(|&i| {
            let after = &rest[i + 2..];
            after.is_empty() || starts_with_key(after)
        })
        .or_else(|| rest.rfind('\''))
        .unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

fn starts_with_key(text: &str) -> bool {
    match text.find("='") {
        Some(pos) if pos > 0 => text[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}
