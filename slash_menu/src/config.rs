//! Menu configuration, written in KDL:
//!
//! ```kdl
//! trigger "/"
//! item "jugem" label="寿限無" description="The long name" icon="📜"
//! text "jugem" "寿限無 寿限無 ..."
//! ```

use std::{fs, io, path::Path};

use itertools::Itertools;
use kdl::{KdlDocument, KdlEntry, KdlNode};
use miette::Diagnostic;
use thiserror::Error;
use tracing::warn;

use crate::{insertion::ReplacementTable, menu::MenuItem, trigger::DEFAULT_TRIGGER};

pub const JUGEM_TEXT: &str = "寿限無 寿限無 五劫のすりきれ 海砂利水魚の水行末 雲来末 風来末";
pub const TOKISOBA_TEXT: &str = "お蕎麦屋さん何ができるんだい？花巻に卓袱？そいじゃあ卓袱をうんと熱くしてもらおうじゃあねえか";

pub const DEFAULT_MENU_CONFIG: &str = r#"// Typing the trigger opens the menu, Enter inserts the text of the highlighted item.
// Put {||} into a text to choose where the caret ends up.
trigger "/"

item "jugem" label="寿限無"
item "tokisoba" label="時そば"

text "jugem" "寿限無 寿限無 五劫のすりきれ 海砂利水魚の水行末 雲来末 風来末"
text "tokisoba" "お蕎麦屋さん何ができるんだい？花巻に卓袱？そいじゃあ卓袱をうんと熱くしてもらおうじゃあねえか"
"#;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("menu config is not a valid KDL document: {0}")]
    #[diagnostic(code(slash_menu::config::syntax))]
    Syntax(#[source] kdl::KdlError),

    #[error("unknown node `{0}`")]
    #[diagnostic(
        code(slash_menu::config::unknown_node),
        help("the menu config understands `trigger`, `item` and `text` nodes")
    )]
    UnknownNode(String),

    #[error("`{node}` node has no {what}")]
    #[diagnostic(code(slash_menu::config::missing_value))]
    Missing { node: String, what: &'static str },

    #[error("{what} of the `{node}` node has to be a string")]
    #[diagnostic(code(slash_menu::config::not_a_string))]
    NotAString { node: String, what: &'static str },

    #[error("`{node}` node has an unknown property `{name}`")]
    #[diagnostic(
        code(slash_menu::config::unknown_property),
        help("`item` nodes accept `label`, `description` and `icon`")
    )]
    UnknownProperty { node: String, name: String },

    #[error("trigger can't be empty")]
    #[diagnostic(code(slash_menu::config::empty_trigger))]
    EmptyTrigger,

    #[error("menu config has no items")]
    #[diagnostic(
        code(slash_menu::config::no_items),
        help(r#"add at least one `item "code" label="..."` node"#)
    )]
    NoItems,

    #[error("menu item `{0}` is defined more than once")]
    #[diagnostic(code(slash_menu::config::duplicate_item))]
    DuplicateItem(String),

    #[error("failed to read menu config: {0}")]
    #[diagnostic(code(slash_menu::config::io))]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    pub trigger: String,
    pub items: Vec<MenuItem>,
    pub replacements: ReplacementTable,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            items: vec![
                MenuItem::new("jugem", "寿限無"),
                MenuItem::new("tokisoba", "時そば"),
            ],
            replacements: ReplacementTable::from_iter([
                ("jugem", JUGEM_TEXT),
                ("tokisoba", TOKISOBA_TEXT),
            ]),
        }
    }
}

impl MenuConfig {
    pub fn parse(src: &str) -> Result<Self, ConfigError> {
        let doc: KdlDocument = src.parse().map_err(ConfigError::Syntax)?;

        let mut trigger = DEFAULT_TRIGGER.to_string();
        let mut items = Vec::new();
        let mut replacements = ReplacementTable::new();

        for node in doc.nodes() {
            match node.name().value() {
                "trigger" => {
                    trigger = string_argument(node, 0, "trigger string")?;
                    if trigger.is_empty() {
                        return Err(ConfigError::EmptyTrigger);
                    }
                }
                "item" => items.push(parse_item(node)?),
                "text" => {
                    let code = string_argument(node, 0, "item code")?;
                    let text = string_argument(node, 1, "replacement text")?;
                    if replacements.insert(code.as_str(), text).is_some() {
                        warn!(%code, "text is defined more than once, using the last one");
                    }
                }
                other => return Err(ConfigError::UnknownNode(other.to_string())),
            }
        }

        if items.is_empty() {
            return Err(ConfigError::NoItems);
        }

        if let Some(code) = items.iter().map(|item| &item.code).duplicates().next() {
            return Err(ConfigError::DuplicateItem(code.clone()));
        }

        for item in items.iter().filter(|item| !replacements.contains(&item.code)) {
            warn!(code = %item.code, "menu item has no text, selecting it will fail");
        }

        for code in replacements
            .codes()
            .filter(|code| !items.iter().any(|item| item.code == *code))
        {
            warn!(%code, "text does not belong to any menu item");
        }

        Ok(Self {
            trigger,
            items,
            replacements,
        })
    }

    /// `Ok(None)` when there is no file at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(src) => Self::parse(&src).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_item(node: &KdlNode) -> Result<MenuItem, ConfigError> {
    let code = string_argument(node, 0, "item code")?;

    let mut label = None;
    let mut description = None;
    let mut icon = None;

    for (name, entry) in node
        .entries()
        .iter()
        .filter_map(|entry| entry.name().map(|name| (name.value(), entry)))
    {
        let slot = match name {
            "label" => &mut label,
            "description" => &mut description,
            "icon" => &mut icon,
            other => {
                return Err(ConfigError::UnknownProperty {
                    node: "item".to_string(),
                    name: other.to_string(),
                });
            }
        };
        *slot = Some(string_value(node, entry, "property value")?);
    }

    let label = label.ok_or_else(|| ConfigError::Missing {
        node: "item".to_string(),
        what: "`label` property",
    })?;

    Ok(MenuItem {
        code,
        label,
        icon,
        description,
    })
}

fn string_argument(node: &KdlNode, index: usize, what: &'static str) -> Result<String, ConfigError> {
    let entry = node
        .entries()
        .iter()
        .filter(|entry| entry.name().is_none())
        .nth(index)
        .ok_or_else(|| ConfigError::Missing {
            node: node.name().value().to_string(),
            what,
        })?;

    string_value(node, entry, what)
}

fn string_value(node: &KdlNode, entry: &KdlEntry, what: &'static str) -> Result<String, ConfigError> {
    entry
        .value()
        .as_string()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::NotAString {
            node: node.name().value().to_string(),
            what,
        })
}
