use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ImageReferenceError {
    #[error("image reference is empty")]
    Empty,

    #[error("image reference `{0}` has an empty repository")]
    EmptyRepository(String),

    #[error("image reference `{0}` has an empty tag or digest")]
    EmptyTag(String),
}

/// A container image split into the parts charts and container runtimes care about.
///
/// The registry (and its port, if any) is kept as part of the repository, so
/// `localhost:5000/velero:1.13.2` has repository `localhost:5000/velero` and tag `1.13.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl FromStr for ImageReference {
    type Err = ImageReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ImageReferenceError::Empty);
        }

        let (name, digest) = match s.split_once('@') {
            Some((_, digest)) if digest.is_empty() => {
                return Err(ImageReferenceError::EmptyTag(s.to_string()))
            }
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (s, None),
        };

        // a colon after the last slash separates the tag, any other one belongs to the registry port
        let last_slash = name.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (repository, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                let tag = &name[split + 1..];
                if tag.is_empty() {
                    return Err(ImageReferenceError::EmptyTag(s.to_string()));
                }
                (&name[..split], Some(tag.to_string()))
            }
            None => (name, None),
        };

        if repository.is_empty() {
            return Err(ImageReferenceError::EmptyRepository(s.to_string()));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag,
            digest,
        })
    }
}

impl Display for ImageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}
