use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};
use rolechat_core::{templates_for, Icon, Message, MessageRole, SettingsField, ROLES};
use crate::app::{App, InputMode, Screen};

const API_KEY_HELP_URL: &str = "https://ai.google.dev/tutorials/setup";

fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Code2 => "</>",
        Icon::UserPlus => "[+]",
        Icon::UserCheck => "[v]",
        Icon::UserCog => "[*]",
        Icon::Stethoscope => "(+)",
        Icon::Film => "[>]",
        Icon::BookOpen => "[=]",
        Icon::Mail => "[@]",
        Icon::GraduationCap => "[^]",
        Icon::BrainCircuit => "{~}",
    }
}

/// Parse a line of text and convert **bold** and `code` markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(bold_text, Style::default().add_modifier(Modifier::BOLD)));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else if c == '`' {
            let mut code_text = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '`' {
                    found_close = true;
                    break;
                }
                code_text.push(c);
            }

            if found_close {
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(code_text, Style::default().fg(Color::Yellow)));
            } else {
                current_text.push('`');
                current_text.push_str(&code_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Render a reply: fenced code blocks, headings and inline markdown
fn markdown_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            let lang = trimmed.trim_start_matches('`').trim();
            if in_code_block && !lang.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", lang),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            continue;
        }

        if in_code_block {
            lines.push(Line::from(Span::styled(
                format!("  {}", line),
                Style::default().fg(Color::Green),
            )));
        } else if let Some(heading) = trimmed.strip_prefix('#') {
            lines.push(Line::from(Span::styled(
                heading.trim_start_matches('#').trim().to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(parse_markdown_line(line));
        }
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let screen = app.screen();
    match screen {
        Screen::ApiKey => render_api_key_form(app, frame, body_area),
        Screen::Roles => render_role_selector(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_settings && screen != Screen::ApiKey {
        render_settings_panel(app, frame, body_area);
    } else if app.show_templates && screen == Screen::Chat {
        render_template_picker(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = app
        .active_role()
        .map(|role| role.name)
        .unwrap_or("AI Assistant");

    let mut spans = vec![
        Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.screen() == Screen::Chat {
        spans.push(Span::styled(
            format!("  {}", rolechat_core::MODEL),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            "  [r] change role  [s] settings  [L] sign out",
            Style::default().fg(Color::White),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let screen = app.screen();
    let mode_text = match screen {
        Screen::ApiKey => " KEY ",
        Screen::Roles => " ROLES ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |k: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", k), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let hints: Vec<Span> = if let Some(status) = &app.status {
        vec![Span::styled(format!(" {} ", status), Style::default().bg(Color::Black).fg(Color::Red))]
    } else if app.show_settings && screen != Screen::ApiKey {
        [hint("j/k", "field"), hint("h/l", "adjust"), hint("H/L", "x10"), hint("Esc", "close")].concat()
    } else {
        match (screen, app.input_mode) {
            (Screen::ApiKey, _) => [hint("Enter", "get started"), hint("Esc", "quit")].concat(),
            (Screen::Roles, _) => [
                hint("j/k", "nav"),
                hint("Enter", "select"),
                hint("s", "settings"),
                hint("L", "sign out"),
                hint("q", "quit"),
            ]
            .concat(),
            (Screen::Chat, _) if app.show_templates => {
                [hint("j/k", "nav"), hint("Enter", "use"), hint("Esc", "close")].concat()
            }
            (Screen::Chat, InputMode::Editing) => [hint("Enter", "send"), hint("Esc", "stop typing")].concat(),
            (Screen::Chat, InputMode::Normal) => [
                hint("i", "type"),
                hint("j/k", "scroll"),
                hint("t", "templates"),
                hint("s", "settings"),
                hint("r", "change role"),
                hint("L", "sign out"),
                hint("q", "quit"),
            ]
            .concat(),
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Centered rectangle of at most `width` x `height` inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Mask the key with asterisks (show last 4 chars)
fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 4 {
        "*".repeat(len)
    } else {
        let masked_len = len - 4;
        let last_four: String = key.chars().skip(masked_len).collect();
        format!("{}{}", "*".repeat(masked_len.min(40)), last_four)
    }
}

fn render_api_key_form(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 64, 11);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Welcome to Gemini AI ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [intro_area, _, label_area, input_area, _, link_area, _, count_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new("Enter your Google AI API key to get started"),
        intro_area,
    );
    frame.render_widget(
        Paragraph::new("Google AI API Key").style(Style::default().fg(Color::DarkGray)),
        label_area,
    );

    let display_text = if app.api_key_input.is_empty() {
        Span::styled("Enter your API key", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(mask_key(&app.api_key_input), Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(Line::from(display_text)), input_area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Get a Google AI API key: "),
            Span::styled(API_KEY_HELP_URL, Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)),
        ])),
        link_area,
    );

    let char_count = format!("{} characters", app.api_key_input.chars().count());
    frame.render_widget(
        Paragraph::new(char_count).style(Style::default().fg(Color::DarkGray)),
        count_area,
    );

    let cursor_x = app.api_key_cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

fn render_role_selector(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let title = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            "Choose Your AI Assistant",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Select a specialized AI role to help you with specific tasks",
            Style::default().fg(Color::DarkGray),
        )),
    ]))
    .centered();
    frame.render_widget(title, title_area);

    let items: Vec<ListItem> = ROLES
        .iter()
        .map(|role| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", icon_glyph(role.icon)), Style::default().fg(Color::Cyan)),
                    Span::styled(role.name, Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(Span::styled(
                    format!("     {}", role.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Roles "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.role_state);
}

/// Every line of the chat log, before wrapping; also drives scroll math
pub fn transcript_lines(messages: &[Message], animation_frame: u8) -> Vec<Line<'static>> {
    messages
        .iter()
        .flat_map(|msg| message_lines(msg, animation_frame))
        .collect()
}

fn message_lines(msg: &Message, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match msg.role {
        MessageRole::User => {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        MessageRole::Model => {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            if msg.is_loading {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                lines.extend(markdown_lines(&msg.content));
            }
        }
    }
    lines.push(Line::default());
    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(role) = app.active_role() else {
        return;
    };

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" {} {} ", icon_glyph(role.icon), role.name));

    let chat_text = if app.session.messages().is_empty() {
        Text::from(vec![
            Line::default(),
            Line::from(Span::styled(
                format!("Welcome to your {} Assistant", role.name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "{}. Press 't' for a template or 'i' to type your own question.",
                    role.description
                ),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .centered()
    } else {
        Text::from(transcript_lines(app.session.messages(), app.animation_frame))
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    let busy = app.session.is_busy();
    let input_border_color = if busy {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_title = if busy {
        " Waiting for reply... ".to_string()
    } else {
        format!(" Ask your {} assistant... ", role.name.to_lowercase())
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(input_title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    // Use cyan text to match the "You:" style - visible in both light and dark terminals
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, input_area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing && !busy {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_settings_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    // Slide-in panel on the right edge
    let width = 44.min(area.width);
    let panel_area = Rect::new(area.x + area.width - width, area.y, width, area.height);

    frame.render_widget(Clear, panel_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Settings ");
    let inner = block.inner(panel_area);
    frame.render_widget(block, panel_area);

    let config = app.prefs.generation_config();
    let selected = app.selected_setting();
    let fields = SettingsField::all();

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = *field == selected;
        let [label_area, gauge_area, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(rows[i]);

        let descriptor = match field {
            SettingsField::Temperature => config.temperature_label(),
            SettingsField::TopP => config.top_p_label(),
            _ => "",
        };

        let label_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(if is_selected { "> " } else { "  " }, label_style),
                Span::styled(
                    format!("{}: {}", field.display_name(), field.format_value(&config)),
                    label_style,
                ),
                Span::styled(format!("  {}", descriptor), Style::default().fg(Color::DarkGray)),
            ])),
            label_area,
        );

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(if is_selected { Color::Yellow } else { Color::Blue }))
            .ratio(field.ratio(&config))
            .label("");
        frame.render_widget(gauge, gauge_area);
    }

    let help_lines: Vec<Line> = fields
        .iter()
        .flat_map(|field| {
            [
                Line::from(vec![
                    Span::styled(field.display_name(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(": "),
                    Span::styled(field.help(), Style::default().fg(Color::DarkGray)),
                ]),
                Line::default(),
            ]
        })
        .collect();

    let help = Paragraph::new(Text::from(help_lines))
        .block(Block::default().borders(Borders::TOP).title(" About these settings "))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, rows[fields.len()]);
}

fn render_template_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(role) = app.active_role() else {
        return;
    };
    let templates = templates_for(role.id);

    let popup_height = (templates.len() as u16) * 2 + 2;
    let popup_area = centered(area, 70, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = templates
        .iter()
        .map(|t| {
            ListItem::new(vec![
                Line::from(Span::styled(t.name, Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(
                    format!("  {}", t.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Prompt Templates "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.template_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_markdown() {
        let line = parse_markdown_line("a **bold** word");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_unclosed_markers_are_literal() {
        assert_eq!(plain(&parse_markdown_line("2 ** 3")), "2 ** 3");
        assert_eq!(plain(&parse_markdown_line("a `tick")), "a `tick");
    }

    #[test]
    fn test_code_fence() {
        let lines = markdown_lines("Here:\n```rust\nfn main() {}\n```\nDone");
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(text, vec!["Here:", "  rust", "  fn main() {}", "Done"]);
    }

    #[test]
    fn test_heading() {
        let lines = markdown_lines("## Title");
        assert_eq!(plain(&lines[0]), "Title");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("abcdefgh"), "****efgh");
    }

    #[test]
    fn test_centered_fits_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered(area, 40, 4);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }
}
