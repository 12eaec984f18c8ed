//! Node paths (`player.items[2].hp`)

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::cache::MemberKey;
use crate::error::PathError;

/// Address of a node: a root name followed by member names and indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    keys: SmallVec<[MemberKey; 4]>,
}

impl NodePath {
    pub fn root(name: &str) -> Self {
        let mut keys = SmallVec::new();
        keys.push(MemberKey::Name(name.to_string()));
        Self { keys }
    }

    /// Extend the path by one key.
    pub fn child(&self, key: impl Into<MemberKey>) -> Self {
        let mut path = self.clone();
        path.keys.push(key.into());
        path
    }

    pub fn keys(&self) -> &[MemberKey] {
        &self.keys
    }

    pub fn root_name(&self) -> &str {
        match self.keys.first() {
            Some(MemberKey::Name(name)) => name,
            _ => "",
        }
    }

    pub fn is_root(&self) -> bool {
        self.keys.len() == 1
    }

    /// Parent path and last key, or `None` for a root path.
    pub fn split_last(&self) -> Option<(NodePath, &MemberKey)> {
        if self.is_root() {
            return None;
        }
        let (last, parent) = self.keys.split_last()?;
        Some((
            NodePath {
                keys: parent.iter().cloned().collect(),
            },
            last,
        ))
    }

    pub(crate) fn push(&mut self, key: MemberKey) {
        self.keys.push(key);
    }

    pub(crate) fn pop(&mut self) {
        if self.keys.len() > 1 {
            self.keys.pop();
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            match key {
                MemberKey::Name(name) if i > 0 => write!(f, ".{}", name)?,
                key => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut keys: SmallVec<[MemberKey; 4]> = SmallVec::new();
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(PathError::Empty);
        }

        while !rest.is_empty() {
            if let Some(inner) = rest.strip_prefix('[') {
                let end = inner
                    .find(']')
                    .ok_or_else(|| PathError::Unclosed(s.to_string()))?;
                let digits = &inner[..end];
                let index = digits
                    .trim()
                    .parse()
                    .map_err(|_| PathError::BadIndex(digits.to_string()))?;
                keys.push(MemberKey::Index(index));
                rest = &inner[end + 1..];
            } else {
                let segment = if keys.is_empty() {
                    rest
                } else {
                    rest.strip_prefix('.')
                        .ok_or_else(|| PathError::EmptySegment(s.to_string()))?
                };
                let end = segment.find(['.', '[']).unwrap_or(segment.len());
                if end == 0 {
                    return Err(PathError::EmptySegment(s.to_string()));
                }
                keys.push(MemberKey::Name(segment[..end].to_string()));
                rest = &segment[end..];
            }
        }

        match keys.first() {
            Some(MemberKey::Name(_)) => Ok(Self { keys }),
            _ => Err(PathError::MissingRoot(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path: NodePath = "player.items[2].hp".parse().unwrap();
        assert_eq!(
            path.keys(),
            [
                MemberKey::from("player"),
                MemberKey::from("items"),
                MemberKey::Index(2),
                MemberKey::from("hp"),
            ]
        );
        assert_eq!(path.to_string(), "player.items[2].hp");
        assert_eq!(path.root_name(), "player");

        let grid: NodePath = "grid[1][0]".parse().unwrap();
        assert_eq!(grid.to_string(), "grid[1][0]");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<NodePath>(), Err(PathError::Empty));
        assert!(matches!(
            "[0].hp".parse::<NodePath>(),
            Err(PathError::MissingRoot(_))
        ));
        assert!(matches!(
            "a..b".parse::<NodePath>(),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            "a[1".parse::<NodePath>(),
            Err(PathError::Unclosed(_))
        ));
        assert!(matches!(
            "a[x]".parse::<NodePath>(),
            Err(PathError::BadIndex(_))
        ));
        assert!(matches!(
            "a[1]b".parse::<NodePath>(),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_split_last() {
        let path = NodePath::root("list").child(3usize).child("hp");
        let (parent, last) = path.split_last().unwrap();
        assert_eq!(parent.to_string(), "list[3]");
        assert_eq!(last, &MemberKey::from("hp"));
        assert!(NodePath::root("list").split_last().is_none());
    }
}
