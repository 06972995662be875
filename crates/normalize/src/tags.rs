//! Tag projections and synthetic marker derivation.
//!
//! [`TagProjections`] holds the three tag lists built from a work's tag
//! entries. [`TagProjections::derive`] consumes it and returns
//! [`DerivedTags`], which has no way back: the original and AI markers are
//! therefore prepended once per record.

use crate::config::TagMarkers;
use crate::types::{AiType, TagEntry};

/// Tag lists before markers are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagProjections {
    plain: Vec<String>,
    both: Vec<String>,
    transl_only: Vec<String>,
    is_original: bool,
    ai_type: AiType,
}

impl TagProjections {
    /// Build the `plain`, `both` and `transl_only` projections.
    pub fn from_entries(entries: &[TagEntry], is_original: bool, ai_type: AiType) -> Self {
        let mut plain = Vec::with_capacity(entries.len());
        let mut both = Vec::with_capacity(entries.len() * 2);
        let mut transl_only = Vec::with_capacity(entries.len());

        for entry in entries {
            plain.push(entry.tag.clone());
            both.push(entry.tag.clone());
            match entry.translation.as_deref().filter(|t| !t.is_empty()) {
                Some(translation) => {
                    both.push(translation.to_string());
                    transl_only.push(translation.to_string());
                }
                None => transl_only.push(entry.tag.clone()),
            }
        }

        Self {
            plain,
            both,
            transl_only,
            is_original,
            ai_type,
        }
    }

    /// Apply the original mark, the AI upgrade and the AI mark, yielding
    /// `[original mark, AI mark, upstream tags...]`.
    pub fn derive(self, markers: &TagMarkers) -> DerivedTags {
        let Self {
            mut plain,
            mut both,
            mut transl_only,
            is_original,
            ai_type,
        } = self;

        if is_original {
            for list in [&mut plain, &mut both, &mut transl_only] {
                unshift_tag(list, &markers.original_mark);
            }
        }

        let ai_type = if ai_type != AiType::Yes && both.iter().any(|t| markers.is_ai_indicator(t)) {
            AiType::Yes
        } else {
            ai_type
        };

        if ai_type == AiType::Yes {
            // Right behind the original mark, ahead of every upstream tag.
            let at = usize::from(is_original);
            for list in [&mut plain, &mut both, &mut transl_only] {
                list.retain(|existing| *existing != markers.ai_mark);
                list.insert(at.min(list.len()), markers.ai_mark.clone());
            }
        }

        DerivedTags {
            plain,
            both,
            transl_only,
            ai_type,
        }
    }
}

/// Tag lists with markers applied, and the effective AI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTags {
    plain: Vec<String>,
    both: Vec<String>,
    transl_only: Vec<String>,
    ai_type: AiType,
}

impl DerivedTags {
    pub fn plain(&self) -> &[String] {
        &self.plain
    }

    pub fn both(&self) -> &[String] {
        &self.both
    }

    pub fn transl_only(&self) -> &[String] {
        &self.transl_only
    }

    pub fn ai_type(&self) -> AiType {
        self.ai_type
    }

    /// `(plain, both, transl_only)`.
    pub fn into_lists(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (self.plain, self.both, self.transl_only)
    }
}

/// Put `tag` at the front of `list`, removing any existing copy first.
pub fn unshift_tag(list: &mut Vec<String>, tag: &str) {
    list.retain(|existing| existing != tag);
    list.insert(0, tag.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<TagEntry> {
        vec![
            TagEntry::translated("風景", "scenery"),
            TagEntry::new("オリジナル"),
            TagEntry::translated("夕焼け", ""),
        ]
    }

    #[test]
    fn projections_interleave_translations() {
        let derived = TagProjections::from_entries(&entries(), false, AiType::No)
            .derive(&TagMarkers::default());

        assert_eq!(derived.plain(), ["風景", "オリジナル", "夕焼け"]);
        assert_eq!(derived.both(), ["風景", "scenery", "オリジナル", "夕焼け"]);
        assert_eq!(derived.transl_only(), ["scenery", "オリジナル", "夕焼け"]);
        assert_eq!(derived.ai_type(), AiType::No);
    }

    #[test]
    fn original_then_ai_marks_lead_every_projection() {
        let derived = TagProjections::from_entries(&entries(), true, AiType::Yes)
            .derive(&TagMarkers::default());

        for list in [derived.plain(), derived.both(), derived.transl_only()] {
            assert_eq!(&list[..2], ["original", "AI-generated"]);
        }
    }

    #[test]
    fn indicator_in_translation_upgrades_ai_type() {
        let tags = vec![TagEntry::translated("AI生成イラスト", "ai art")];
        let derived = TagProjections::from_entries(&tags, false, AiType::Unknown)
            .derive(&TagMarkers::default());

        assert_eq!(derived.ai_type(), AiType::Yes);
        assert_eq!(derived.plain(), ["AI-generated", "AI生成イラスト"]);
    }

    #[test]
    fn no_indicator_keeps_ai_type() {
        let derived = TagProjections::from_entries(&entries(), false, AiType::Unknown)
            .derive(&TagMarkers::default());
        assert_eq!(derived.ai_type(), AiType::Unknown);
        assert!(!derived.plain().iter().any(|t| t == "AI-generated"));
    }

    #[test]
    fn upstream_tag_equal_to_mark_is_not_duplicated() {
        let tags = vec![TagEntry::new("original"), TagEntry::new("sky")];
        let derived = TagProjections::from_entries(&tags, true, AiType::No)
            .derive(&TagMarkers::default());
        assert_eq!(derived.plain(), ["original", "sky"]);
    }

    #[test]
    fn unshift_moves_existing_tag_to_front() {
        let mut list = vec!["a".to_string(), "b".to_string()];
        unshift_tag(&mut list, "b");
        assert_eq!(list, ["b", "a"]);
    }
}
