use ratatui::style::{Color, Modifier, Style};

/// Return the border style for active blocks.
///
pub fn active_block_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Return the border style for normal blocks.
///
pub fn normal_block_border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Return the border style for a block under the dragged entity.
///
pub fn drop_target_border_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Return the style for the floating copy of a dragged entity.
///
pub fn drag_ghost_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
}

/// Return the title style for active blocks.
///
pub fn active_block_title_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Return the style for current list items.
///
pub fn current_list_item_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Return the style for active list items.
///
pub fn active_list_item_style() -> Style {
    current_list_item_style().fg(Color::Cyan)
}

/// Return the style for normal text.
///
pub fn normal_text_style() -> Style {
    Style::default()
}

pub fn muted_text_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn error_text_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn info_text_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Return the style for the banner.
///
pub fn banner_style() -> Style {
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
}
