use std::fmt::Write as _;

use crate::{
    error::{RoomVibeError, RoomVibeResult},
    geometry::NormPoint,
    model::FrameStyle,
};

/// The placement snapshot a share link carries: enough to restore the view,
/// nothing ephemeral. Centers are normalized and validated on parse.
#[derive(Clone, Debug, PartialEq)]
pub struct SharePlacement {
    pub room_id: String,
    pub artwork_id: String,
    pub frame: FrameStyle,
    pub center: NormPoint,
}

impl SharePlacement {
    /// Query-string form, e.g. `room=living&art=a0&frame=black&cx=0.5000&cy=0.5000`.
    pub fn to_query(&self) -> String {
        let mut q = String::new();
        push_pair(&mut q, "room", &self.room_id);
        push_pair(&mut q, "art", &self.artwork_id);
        push_pair(&mut q, "frame", self.frame.as_str());
        let _ = write!(q, "&cx={:.4}&cy={:.4}", self.center.x, self.center.y);
        q
    }

    pub fn parse(query: &str) -> RoomVibeResult<Self> {
        let mut room = None;
        let mut art = None;
        let mut frame = FrameStyle::None;
        let mut cx = None;
        let mut cy = None;

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| RoomVibeError::validation(format!("malformed pair '{pair}'")))?;
            let value = decode(value)?;
            match key {
                "room" => room = Some(value),
                "art" => art = Some(value),
                "frame" => frame = FrameStyle::parse(&value)?,
                "cx" => cx = Some(parse_coord("cx", &value)?),
                "cy" => cy = Some(parse_coord("cy", &value)?),
                _ => {} // foreign params pass through untouched
            }
        }

        let room_id =
            room.ok_or_else(|| RoomVibeError::validation("share link missing 'room'"))?;
        let artwork_id =
            art.ok_or_else(|| RoomVibeError::validation("share link missing 'art'"))?;
        let center = match (cx, cy) {
            (Some(x), Some(y)) => NormPoint { x, y }.validated()?,
            (None, None) => NormPoint::CENTER,
            _ => {
                return Err(RoomVibeError::validation(
                    "share link must carry both 'cx' and 'cy' or neither",
                ))
            }
        };

        Ok(Self {
            room_id,
            artwork_id,
            frame,
            center,
        })
    }
}

fn parse_coord(key: &str, value: &str) -> RoomVibeResult<f64> {
    value
        .parse::<f64>()
        .map_err(|_| RoomVibeError::validation(format!("'{key}' is not a number: '{value}'")))
}

fn push_pair(q: &mut String, key: &str, value: &str) {
    if !q.is_empty() {
        q.push('&');
    }
    q.push_str(key);
    q.push('=');
    encode_into(q, value);
}

fn encode_into(out: &mut String, value: &str) {
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
}

fn decode(value: &str) -> RoomVibeResult<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        RoomVibeError::validation(format!("bad percent escape in '{value}'"))
                    })?;
                out.push(hex);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|_| RoomVibeError::validation(format!("share value '{value}' is not utf-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> SharePlacement {
        SharePlacement {
            room_id: "living".to_string(),
            artwork_id: "a0".to_string(),
            frame: FrameStyle::Black,
            center: NormPoint { x: 0.25, y: 0.75 },
        }
    }

    #[test]
    fn query_roundtrip() {
        let q = placement().to_query();
        assert_eq!(q, "room=living&art=a0&frame=black&cx=0.2500&cy=0.7500");
        assert_eq!(SharePlacement::parse(&q).unwrap(), placement());
    }

    #[test]
    fn ids_are_percent_encoded() {
        let mut p = placement();
        p.artwork_id = "mona lisa/1".to_string();
        let q = p.to_query();
        assert!(q.contains("art=mona%20lisa%2F1"));
        assert_eq!(SharePlacement::parse(&q).unwrap().artwork_id, "mona lisa/1");
    }

    #[test]
    fn missing_center_defaults_and_half_center_errors() {
        let p = SharePlacement::parse("room=r&art=a").unwrap();
        assert_eq!(p.center, NormPoint::CENTER);
        assert_eq!(p.frame, FrameStyle::None);
        assert!(SharePlacement::parse("room=r&art=a&cx=0.5").is_err());
    }

    #[test]
    fn out_of_range_center_is_rejected() {
        assert!(SharePlacement::parse("room=r&art=a&cx=1.5&cy=0.5").is_err());
        assert!(SharePlacement::parse("room=r&art=a&cx=-0.1&cy=0.5").is_err());
    }

    #[test]
    fn unknown_frame_and_missing_ids_error() {
        assert!(SharePlacement::parse("room=r&art=a&frame=neon").is_err());
        assert!(SharePlacement::parse("art=a").is_err());
        assert!(SharePlacement::parse("room=r").is_err());
    }

    #[test]
    fn leading_question_mark_and_foreign_params_tolerated() {
        let p = SharePlacement::parse("?utm_source=x&room=r&art=a&frame=gold").unwrap();
        assert_eq!(p.frame, FrameStyle::Gold);
    }
}
