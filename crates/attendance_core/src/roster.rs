//! crates/attendance_core/src/roster.rs
//!
//! The fixed, ordered list of members known at startup.

use serde::Serialize;

const CLUB_MEMBERS: [&str; 37] = [
    "熱田 望", "池田 大翔", "岩間 悠希", "白石 怜大", "高椋 煌生",
    "布施 皓己", "吉井 千智", "秋山 七星", "大庭 悠誠", "熊谷 流星",
    "佐藤 勘太", "下田 聖", "遅 志丞", "皆川 哲弥", "宮崎 惺也",
    "山崎 泰蔵", "片山 幸典", "葛石 知佑", "金 悠鉉", "小林 慈人",
    "坂内 元気", "下村 篤生", "染谷 尚太朗", "高木 翔玄", "棚瀬 侑真",
    "中野 琥太郎", "西内 幸輝", "野田 慧", "秀村 紘嗣", "船津 太一",
    "槇 啓秀", "松井 俐真", "森本 直樹", "山田 悠聖", "若林 空",
    "小畑 高慈", "龍口 直史",
];

/// An immutable, ordered roster. Uniqueness of names is assumed, not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a roster file: one name per line, surrounding whitespace and blank lines ignored.
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(CLUB_MEMBERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_keeps_club_order() {
        let roster = Roster::default();
        assert_eq!(roster.len(), 37);
        assert_eq!(roster.iter().next(), Some("熱田 望"));
        assert!(roster.contains("佐藤 勘太"));
        assert!(!roster.contains("佐藤"));
    }

    #[test]
    fn roster_file_skips_blank_lines() {
        let roster = Roster::from_lines("  山田 悠聖\n\n若林 空  \n\t\n");
        assert_eq!(roster.iter().collect::<Vec<_>>(), vec!["山田 悠聖", "若林 空"]);
    }
}
