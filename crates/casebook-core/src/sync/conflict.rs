use crate::test_case::TestCase;

/// Which version of a conflicted case to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "mine" => Ok(Side::Local),
            "remote" | "theirs" => Ok(Side::Remote),
            other => Err(format!("unknown side '{other}', expected local or remote")),
        }
    }
}

/// The two diverging versions of one case, produced by a pull.
///
/// Only lives until it is resolved; resolving consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    local: TestCase,
    remote: TestCase,
}

impl Conflict {
    pub(crate) fn new(local: TestCase, remote: TestCase) -> Self {
        debug_assert_eq!(local.id, remote.id);
        Self { local, remote }
    }

    /// Identity of the conflicted case.
    pub fn id(&self) -> &str {
        &self.local.id
    }

    pub fn local(&self) -> &TestCase {
        &self.local
    }

    pub fn remote(&self) -> &TestCase {
        &self.remote
    }

    pub fn side(&self, side: Side) -> &TestCase {
        match side {
            Side::Local => &self.local,
            Side::Remote => &self.remote,
        }
    }

    pub(crate) fn into_side(self, side: Side) -> TestCase {
        match side {
            Side::Local => self.local,
            Side::Remote => self.remote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!("local".parse::<Side>(), Ok(Side::Local));
        assert_eq!("Remote".parse::<Side>(), Ok(Side::Remote));
        assert_eq!("theirs".parse::<Side>(), Ok(Side::Remote));
        assert!("both".parse::<Side>().is_err());
    }
}
