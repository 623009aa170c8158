use serde::{Deserialize, Serialize};

/// Integer identity of a node. Never reused for another node in the same tree.
pub type NodeId = i64;

/// The two disjoint tree universes. A `parent_id` never crosses from one to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Menu,
    Folder,
}

impl TreeKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            TreeKind::Menu => "menus",
            TreeKind::Folder => "folders",
        }
    }
}

impl std::fmt::Display for TreeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeKind::Menu => write!(f, "menu"),
            TreeKind::Folder => write!(f, "folder"),
        }
    }
}

/// Kind-specific data carried by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    Menu {
        title: String,
        #[serde(default)]
        route: Option<String>,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default)]
        permission_name: Option<String>,
    },
    Folder {
        name: String,
        #[serde(default)]
        mime_type: Option<String>,
    },
}

/// One persisted row as handed over by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub order: i32,
    #[serde(flatten)]
    pub payload: NodePayload,
}

impl FlatRecord {
    pub fn menu(id: NodeId, parent_id: Option<NodeId>, order: i32, title: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            order,
            payload: NodePayload::Menu {
                title: title.into(),
                route: None,
                icon: None,
                permission_name: None,
            },
        }
    }

    pub fn folder(id: NodeId, parent_id: Option<NodeId>, order: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            order,
            payload: NodePayload::Folder {
                name: name.into(),
                mime_type: None,
            },
        }
    }

    /// Set the route of a menu record. No-op for folders.
    pub fn with_route(mut self, new_route: impl Into<String>) -> Self {
        if let NodePayload::Menu { route, .. } = &mut self.payload {
            *route = Some(new_route.into());
        }
        self
    }

    /// Set the permission key of a menu record. No-op for folders.
    pub fn with_permission(mut self, key: impl Into<String>) -> Self {
        if let NodePayload::Menu { permission_name, .. } = &mut self.payload {
            *permission_name = Some(key.into());
        }
        self
    }

    pub fn with_icon(mut self, name: impl Into<String>) -> Self {
        if let NodePayload::Menu { icon, .. } = &mut self.payload {
            *icon = Some(name.into());
        }
        self
    }

    pub fn kind(&self) -> TreeKind {
        match self.payload {
            NodePayload::Menu { .. } => TreeKind::Menu,
            NodePayload::Folder { .. } => TreeKind::Folder,
        }
    }

    /// Title for menus, name for folders.
    pub fn label(&self) -> &str {
        match &self.payload {
            NodePayload::Menu { title, .. } => title,
            NodePayload::Folder { name, .. } => name,
        }
    }

    /// Navigation route, if any. Blank routes count as absent.
    pub fn route(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Menu { route, .. } => route.as_deref().filter(|r| !r.trim().is_empty()),
            NodePayload::Folder { .. } => None,
        }
    }

    pub fn permission_key(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Menu { permission_name, .. } => {
                permission_name.as_deref().filter(|p| !p.trim().is_empty())
            }
            NodePayload::Folder { .. } => None,
        }
    }
}

/// Minimal write-back unit produced by a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub id: NodeId,
    pub order: i32,
    pub parent_id: Option<NodeId>,
}
