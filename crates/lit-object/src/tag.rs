use bstr::{BStr, BString, ByteSlice};
use lit_hash::ObjectId;
use lit_utils::date::Signature;

use crate::{ObjectError, ObjectType};

/// An annotated tag: a named, signed pointer at another object (usually a
/// commit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: ObjectId,
    pub target_type: ObjectType,
    pub tag_name: BString,
    /// Absent on old-style tags that predate the tagger line.
    pub tagger: Option<Signature>,
    pub message: BString,
    pub gpgsig: Option<BString>,
}

#[derive(Default)]
struct TagFields {
    target: Option<ObjectId>,
    target_type: Option<ObjectType>,
    tag_name: Option<BString>,
    tagger: Option<Signature>,
}

impl TagFields {
    fn absorb(&mut self, key: &[u8], value: &[u8]) -> Result<(), ObjectError> {
        match key {
            b"object" => {
                let hex = std::str::from_utf8(value)
                    .map_err(|_| ObjectError::InvalidHeader("non-UTF8 target OID".into()))?;
                self.target = Some(ObjectId::from_hex(hex)?);
            }
            b"type" => self.target_type = Some(ObjectType::from_bytes(value)?),
            b"tag" => self.tag_name = Some(BString::from(value)),
            b"tagger" => {
                self.tagger =
                    Some(Signature::parse(BStr::new(value)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))?)
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self, message: BString, gpgsig: Option<BString>) -> Result<Tag, ObjectError> {
        Ok(Tag {
            target: self.target.ok_or(ObjectError::MissingTagField { field: "object" })?,
            target_type: self.target_type.ok_or(ObjectError::MissingTagField { field: "type" })?,
            tag_name: self.tag_name.ok_or(ObjectError::MissingTagField { field: "tag" })?,
            tagger: self.tagger,
            message,
            gpgsig,
        })
    }
}

const SIGNATURE_MARKERS: [&[u8]; 2] = [b"-----BEGIN PGP SIGNATURE-----", b"-----BEGIN SSH SIGNATURE-----"];

/// Tags embed their signature (if any) inline at the tail of the message
/// rather than in a header, so splitting it out means scanning the body
/// for a known marker instead of reading a field.
fn split_message_and_signature(body: &[u8]) -> (BString, Option<BString>) {
    let marker_at = SIGNATURE_MARKERS.iter().find_map(|marker| body.find(marker));
    match marker_at {
        Some(at) => (BString::from(&body[..at]), Some(BString::from(&body[at..]))),
        None => (BString::from(body), None),
    }
}

impl Tag {
    /// Parse tag content (no object header / size prefix).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut fields = TagFields::default();
        let mut pos = 0;

        loop {
            match content.get(pos) {
                None => break,
                Some(b'\n') => {
                    pos += 1;
                    break;
                }
                Some(_) => {}
            }

            let line_end = content[pos..].iter().position(|&b| b == b'\n').map_or(content.len(), |p| p + pos);
            let line = &content[pos..line_end];

            if let Some(space) = line.iter().position(|&b| b == b' ') {
                fields.absorb(&line[..space], &line[space + 1..])?;
            }

            pos = line_end + 1;
        }

        let (message, gpgsig) = split_message_and_signature(&content[pos..]);
        fields.finish(message, gpgsig)
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"type ");
        out.extend_from_slice(self.target_type.as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.tag_name);
        out.push(b'\n');

        if let Some(tagger) = &self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        if let Some(sig) = &self.gpgsig {
            out.extend_from_slice(sig);
        }

        out
    }
}
