//! チャットのセッション状態（表示用履歴と現在地）
//!
//! UI スレッドだけが書き込む。ワーカーには毎ターン現在地のコピーを渡す。

use crate::places::Coordinate;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Default, Clone)]
pub struct Session {
    location: Option<Coordinate>,
    turns: Vec<ChatTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    /// 新しい位置情報で上書きする
    pub fn set_location(&mut self, coord: Coordinate) {
        self.location = Some(coord);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn { role: Role::User, content: content.into() });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn { role: Role::Assistant, content: content.into() });
    }

    /// 表示用の履歴だけを消す（エージェントの記憶は残る）
    pub fn clear_turns(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_are_append_only_in_order() {
        let mut s = Session::new();
        s.push_user("cafes in Jalandhar");
        s.push_assistant("- Cafe A");
        let roles: Vec<Role> = s.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn location_is_overwritten() {
        let mut s = Session::new();
        assert!(s.location().is_none());
        s.set_location(Coordinate::new(1.0, 1.0).unwrap());
        s.set_location(Coordinate::new(28.6, 77.2).unwrap());
        assert_eq!(s.location(), Coordinate::new(28.6, 77.2));
    }
}
