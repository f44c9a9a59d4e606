//! Navigation-related state types.

use crate::model::ItemKind;

/// Specifying the different views.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum View {
    Home,
    Workspace,
    Items(ItemKind),
    Board,
    Note,
    Whiteboard,
    Admin,
}

impl View {
    /// Title shown above the view.
    ///
    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Open workspace",
            View::Workspace => "Workspace",
            View::Items(ItemKind::Kanban) => "Boards",
            View::Items(ItemKind::Note) => "Notes",
            View::Items(ItemKind::Whiteboard) => "Whiteboards",
            View::Board => "Board",
            View::Note => "Note",
            View::Whiteboard => "Whiteboard",
            View::Admin => "Admin",
        }
    }

    /// View that shows an open item of the given kind.
    ///
    pub fn for_item(kind: ItemKind) -> View {
        match kind {
            ItemKind::Kanban => View::Board,
            ItemKind::Note => View::Note,
            ItemKind::Whiteboard => View::Whiteboard,
        }
    }
}

/// Entries of the workspace menu.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MenuEntry {
    Boards,
    Notes,
    Whiteboards,
    Admin,
}

impl MenuEntry {
    /// Menu entries available to a workspace. Admin only shows for admin
    /// workspaces.
    ///
    pub fn entries(is_admin: bool) -> Vec<MenuEntry> {
        let mut entries = vec![MenuEntry::Boards, MenuEntry::Notes, MenuEntry::Whiteboards];
        if is_admin {
            entries.push(MenuEntry::Admin);
        }
        entries
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Boards => "Kanban boards",
            MenuEntry::Notes => "Notes",
            MenuEntry::Whiteboards => "Whiteboards",
            MenuEntry::Admin => "Admin",
        }
    }

    pub fn view(&self) -> View {
        match self {
            MenuEntry::Boards => View::Items(ItemKind::Kanban),
            MenuEntry::Notes => View::Items(ItemKind::Note),
            MenuEntry::Whiteboards => View::Items(ItemKind::Whiteboard),
            MenuEntry::Admin => View::Admin,
        }
    }
}

/// Pending destructive action waiting for `y`.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Confirm {
    DeleteColumn(String),
    DeleteItem { id: String, kind: ItemKind },
    DeleteWorkspace(String),
}

impl Confirm {
    pub fn question(&self) -> String {
        match self {
            Confirm::DeleteColumn(_) => "Delete this column and all its cards? (y/n)".to_string(),
            Confirm::DeleteItem { kind, .. } => format!("Delete this {}? (y/n)", kind),
            Confirm::DeleteWorkspace(id) => format!("Delete workspace '{}'? (y/n)", id),
        }
    }
}
