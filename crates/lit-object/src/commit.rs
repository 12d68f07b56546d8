use bstr::{BStr, BString, ByteSlice};
use lit_hash::ObjectId;
use lit_utils::date::Signature;

use crate::ObjectError;

/// A commit object: a tree snapshot plus the lineage and authorship that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    /// Empty for a root commit, two or more for a merge.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Present when the message isn't UTF-8 (e.g. `"ISO-8859-1"`).
    pub encoding: Option<BString>,
    /// A detached GPG signature, stored continuation-indented on disk.
    pub gpgsig: Option<BString>,
    /// Headers this build doesn't know about, kept so re-serializing a
    /// parsed commit never drops data.
    pub extra_headers: Vec<(BString, BString)>,
    pub message: BString,
}

/// Headers accumulate into this as the scanner walks the commit, then get
/// validated once at the end rather than inline as each required field
/// arrives.
#[derive(Default)]
struct CommitFields {
    tree: Option<ObjectId>,
    parents: Vec<ObjectId>,
    author: Option<Signature>,
    committer: Option<Signature>,
    encoding: Option<BString>,
    gpgsig: Option<BString>,
    extra_headers: Vec<(BString, BString)>,
}

impl CommitFields {
    fn absorb(&mut self, key: &[u8], value: BString) -> Result<(), ObjectError> {
        match key {
            b"tree" => self.tree = Some(parse_oid_header(&value, "tree")?),
            b"parent" => self.parents.push(parse_oid_header(&value, "parent")?),
            b"author" => self.author = Some(parse_signature(&value)?),
            b"committer" => self.committer = Some(parse_signature(&value)?),
            b"encoding" => self.encoding = Some(value),
            b"gpgsig" | b"gpgsig-sha256" => self.gpgsig = Some(value),
            other => self.extra_headers.push((BString::from(other), value)),
        }
        Ok(())
    }

    fn finish(self, message: BString) -> Result<Commit, ObjectError> {
        Ok(Commit {
            tree: self.tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?,
            parents: self.parents,
            author: self.author.ok_or(ObjectError::MissingCommitField { field: "author" })?,
            committer: self.committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?,
            encoding: self.encoding,
            gpgsig: self.gpgsig,
            extra_headers: self.extra_headers,
            message,
        })
    }
}

fn parse_oid_header(value: &[u8], field: &'static str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF8 {field} OID")))?;
    Ok(ObjectId::from_hex(hex)?)
}

/// Walks a commit's header block line by line, folding continuation lines
/// (any line starting with a single space) into the header they follow.
/// Stops at the first blank line, which separates headers from the message.
struct HeaderScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderScanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        HeaderScanner { data, pos: 0 }
    }

    fn line_from(&self, start: usize) -> &'a [u8] {
        let end = self.data[start..].iter().position(|&b| b == b'\n').map_or(self.data.len(), |p| p + start);
        &self.data[start..end]
    }

    /// Returns `Some((key, value))` for the next logical header, or `None`
    /// once the blank-line terminator (or end of input) is reached — at
    /// which point `self.pos` sits at the start of the message body.
    fn next(&mut self) -> Option<(&'a [u8], BString)> {
        if self.pos >= self.data.len() || self.data[self.pos] == b'\n' {
            if self.pos < self.data.len() {
                self.pos += 1;
            }
            return None;
        }

        let line = self.line_from(self.pos);
        self.pos += line.len() + 1;

        let Some(space) = line.iter().position(|&b| b == b' ') else {
            // Malformed header line with no value; skip and keep scanning.
            return self.next();
        };
        let key = &line[..space];
        let mut value = BString::from(&line[space + 1..]);

        while self.pos < self.data.len() && self.data[self.pos] == b' ' {
            let cont = self.line_from(self.pos);
            value.push(b'\n');
            value.extend_from_slice(&cont[1..]);
            self.pos += cont.len() + 1;
        }

        Some((key, value))
    }
}

impl Commit {
    /// Parse commit content (no object header / size prefix).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut scanner = HeaderScanner::new(content);
        let mut fields = CommitFields::default();
        while let Some((key, value)) = scanner.next() {
            fields.absorb(key, value)?;
        }
        fields.finish(BString::from(&content[scanner.pos..]))
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        if let Some(enc) = &self.encoding {
            out.extend_from_slice(b"encoding ");
            out.extend_from_slice(enc);
            out.push(b'\n');
        }

        if let Some(sig) = &self.gpgsig {
            write_folded_header(&mut out, b"gpgsig", sig);
        }

        for (key, val) in &self.extra_headers {
            write_folded_header(&mut out, key, val);
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }

    /// Everything past the first blank line in the message, if the message
    /// has one.
    pub fn body(&self) -> Option<&BStr> {
        let msg: &[u8] = self.message.as_ref();
        msg.find(b"\n\n").map(|pos| BStr::new(&msg[pos + 2..]))
    }
}

fn write_folded_header(out: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    out.extend_from_slice(key);
    out.push(b' ');
    for (i, line) in value.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            out.push(b'\n');
            out.push(b' ');
        }
        out.extend_from_slice(line);
    }
    out.push(b'\n');
}

fn parse_signature(data: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(data)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}
