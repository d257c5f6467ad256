// Converts Discord message content into transcript HTML.
//
// Message text is escaped, so user content can never inject markup. The only
// tags produced are the ones this module emits itself: `<pre>` for fenced
// code blocks, `<img class="emoji">` for custom emoji, `<br>` for newlines.

use super::transcript_theme::{render_header, FOOTER};
use regex::Regex;
use std::sync::LazyLock;
use v_htmlescape::escape;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ANSI pattern is valid")
});

static CUSTOM_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a?:(\w+):(\d+)>").expect("emoji pattern is valid"));

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(everyone|here|[!&]?[0-9]{17,20})").expect("mention pattern is valid")
});

const CODE_FENCE: &str = "```";
const EMOJI_SIZE: u32 = 24;
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp", ".avif"];

/// Username colour used when the author has no coloured role.
pub const DEFAULT_NAME_COLOR: &str = "#dcddde";

/// One chat message, already reduced to what the transcript shows.
#[derive(Debug, Clone)]
pub struct TranscriptMessage {
    pub author_name: String,
    pub avatar_url: String,
    /// CSS colour for the username, e.g. `#e91e63`
    pub name_color: String,
    pub content: String,
    pub attachment_urls: Vec<String>,
}

pub fn emoji_url(emoji_id: &str) -> String {
    format!(
        "https://cdn.discordapp.com/emojis/{}.webp?size=128&quality=lossless",
        emoji_id
    )
}

/// `0xE91E63` -> `#e91e63`; `0` (no role colour) -> the default text colour.
pub fn color_hex(color: u32) -> String {
    if color == 0 {
        DEFAULT_NAME_COLOR.to_string()
    } else {
        format!("#{:06x}", color & 0xFF_FFFF)
    }
}

/// Colour of the highest positioned role that has one, `0` if none does.
///
/// `roles` are `(position, colour)` pairs for the author's roles.
pub fn top_role_color(roles: &[(u16, u32)]) -> u32 {
    roles
        .iter()
        .filter(|(_, colour)| *colour != 0)
        .max_by_key(|(position, _)| *position)
        .map(|(_, colour)| *colour)
        .unwrap_or(0)
}

/// `general chat/2024` -> `general_chat_2024.html`
pub fn transcript_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "transcript.html".to_string()
    } else {
        format!("{}.html", stem)
    }
}

pub fn remove_ansi_sequences(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Break `@everyone`, `@here` and raw id mentions with a zero-width space.
fn defuse_mentions(text: &str) -> String {
    MENTION.replace_all(text, "@\u{200b}$1").into_owned()
}

/// Render plain (non code) message text.
fn render_text(text: &str) -> String {
    let text = remove_ansi_sequences(text);
    let text = defuse_mentions(&text).replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in CUSTOM_EMOJI.captures_iter(&text) {
        let whole = caps.get(0).expect("group 0 always exists");
        out.push_str(&escape(&text[last..whole.start()]).to_string());
        out.push_str(&format!(
            "<img class=\"emoji\" src=\"{}\" alt=\":{}:\" width=\"{size}\" height=\"{size}\" />",
            emoji_url(&caps[2]),
            escape(&caps[1]),
            size = EMOJI_SIZE
        ));
        last = whole.end();
    }
    out.push_str(&escape(&text[last..]).to_string());

    out.replace('\n', "<br>")
}

/// Render the body of a message.
///
/// Fenced code blocks become `<pre>` with ANSI colour codes removed. An
/// unterminated fence is treated as text.
pub fn escape_message(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(open) = rest.find(CODE_FENCE) {
        let after_open = &rest[open + CODE_FENCE.len()..];
        let Some(close) = after_open.find(CODE_FENCE) else {
            break;
        };

        out.push_str(&render_text(&rest[..open]));
        let code = remove_ansi_sequences(&after_open[..close]);
        out.push_str(&format!("<pre>{}</pre>", escape(&code)));
        rest = &after_open[close + CODE_FENCE.len()..];
    }
    out.push_str(&render_text(rest));

    out
}

fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Images are shown inline, anything else becomes a download link.
pub fn render_attachments(urls: &[String]) -> String {
    if urls.is_empty() {
        return String::new();
    }

    let parts: String = urls
        .iter()
        .map(|url| {
            let url_attr = escape(url);
            if is_image_url(url) {
                format!(
                    "<div class=\"attachment\"><img src=\"{}\" alt=\"Attachment\"></div>",
                    url_attr
                )
            } else {
                format!(
                    "<div class=\"attachment\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Download attachment</a></div>",
                    url_attr
                )
            }
        })
        .collect();

    format!("<div class=\"attachments\">{}</div>", parts)
}

pub fn render_message(message: &TranscriptMessage) -> String {
    let author = escape(&message.author_name);
    format!(
        r#"
    <div class="message">
      <img class="avatar" src="{avatar}" alt="{author} avatar">
      <div class="content">
        <div class="header">
          <span class="username" style="color:{color}">{author}</span>
        </div>
        <div class="message-body">{body}</div>
        {attachments}
      </div>
    </div>
"#,
        avatar = escape(&message.avatar_url),
        author = author,
        color = escape(&message.name_color),
        body = escape_message(&message.content),
        attachments = render_attachments(&message.attachment_urls),
    )
}

/// Render a complete transcript document.
///
/// `newest_first` is in Discord history order; the page lists messages
/// oldest first. `thread` adds an id/name line under the title.
pub fn render_transcript(
    title: &str,
    thread: Option<(u64, &str)>,
    newest_first: &[TranscriptMessage],
) -> String {
    let mut html = render_header(title);

    if let Some((thread_id, thread_name)) = thread {
        html.push_str(&format!(
            "    <div class=\"thread-info\">Thread ID: {}, Name: {}</div>\n",
            thread_id,
            escape(thread_name)
        ));
    }

    for message in newest_first.iter().rev() {
        html.push_str(&render_message(message));
    }

    html.push_str(FOOTER);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(author: &str, content: &str) -> TranscriptMessage {
        TranscriptMessage {
            author_name: author.to_string(),
            avatar_url: "https://cdn.discordapp.com/embed/avatars/0.png".to_string(),
            name_color: color_hex(0x3498db),
            content: content.to_string(),
            attachment_urls: vec![],
        }
    }

    #[test]
    fn test_text_is_html_escaped() {
        let html = escape_message("<script>alert('x')</script> & \"co\"");
        assert!(html.starts_with("&lt;script&gt;alert("));
        assert!(html.contains("&amp; &quot;co&quot;"));
        assert!(!html.contains('<'));
        assert!(!html.contains('\''));
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(escape_message("a\r\nb\rc\nd"), "a<br>b<br>c<br>d");
    }

    #[test]
    fn test_code_block_is_preformatted_without_ansi() {
        let html = escape_message("before ```\x1b[31mred <b>\x1b[0m``` after");
        assert_eq!(html, "before <pre>red &lt;b&gt;</pre> after");
    }

    #[test]
    fn test_unterminated_fence_stays_text() {
        assert_eq!(escape_message("```oops"), "```oops");
    }

    #[test]
    fn test_multiple_code_blocks() {
        let html = escape_message("```a``` mid ```b```");
        assert_eq!(html, "<pre>a</pre> mid <pre>b</pre>");
    }

    #[test]
    fn test_custom_emoji_become_images() {
        let html = escape_message("hi <:wave:123456> and <a:party:789>");
        assert!(html.starts_with("hi <img class=\"emoji\" src=\"https://cdn.discordapp.com/emojis/123456.webp?size=128&quality=lossless\""));
        assert!(html.contains("alt=\":wave:\""));
        assert!(html.contains("emojis/789.webp"));
        assert!(!html.contains("&lt;:wave"));
    }

    #[test]
    fn test_mass_mentions_are_defused() {
        let html = escape_message("@everyone look");
        assert_eq!(html, "@\u{200b}everyone look");
    }

    #[test]
    fn test_attachments() {
        assert_eq!(render_attachments(&[]), "");

        let html = render_attachments(&[
            "https://cdn.discordapp.com/a/b/cat.PNG?ex=1&is=2".to_string(),
            "https://cdn.discordapp.com/a/b/notes.pdf".to_string(),
        ]);
        assert!(html.starts_with("<div class=\"attachments\">"));
        assert!(html.contains("<img src=\""));
        assert!(html.contains("cat.PNG?ex=1&amp;is=2\" alt=\"Attachment\""));
        assert!(html.contains("<a href=\""));
        assert!(html.contains("notes.pdf\" target=\"_blank\""));
        assert!(html.contains("Download attachment"));
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(color_hex(0xE91E63), "#e91e63");
        assert_eq!(color_hex(0x00000F), "#00000f");
        assert_eq!(color_hex(0), DEFAULT_NAME_COLOR);
    }

    #[test]
    fn test_top_role_color() {
        assert_eq!(top_role_color(&[]), 0);
        assert_eq!(top_role_color(&[(1, 0xff0000), (5, 0x00ff00), (9, 0)]), 0x00ff00);
    }

    #[test]
    fn test_transcript_file_name() {
        assert_eq!(transcript_file_name("general"), "general.html");
        assert_eq!(transcript_file_name("bug report/42"), "bug_report_42.html");
        assert_eq!(transcript_file_name(""), "transcript.html");
    }

    #[test]
    fn test_transcript_is_oldest_first_and_closed() {
        let newest_first = vec![message("bob", "second"), message("alice", "first")];
        let html = render_transcript("general", None, &newest_first);

        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Transcript of general</title>"));
        assert!(html.ends_with("</main></body></html>"));
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert!(!html.contains("Thread ID"));
    }

    #[test]
    fn test_thread_transcript_has_thread_line() {
        let html = render_transcript("ideas", Some((42, "ideas")), &[message("a", "b")]);
        assert!(html.contains("Thread ID: 42, Name: ideas"));
    }

    #[test]
    fn test_author_name_is_escaped() {
        let html = render_message(&message("<img src=x>", "hi"));
        assert!(html.contains("&lt;img src=x&gt;"));
        assert!(!html.contains("<img src=x>"));
    }

    #[test]
    fn test_attribute_values_cannot_break_out() {
        let mut msg = message("a", "hi");
        msg.avatar_url = "x\" onerror=\"alert(1)".to_string();
        msg.attachment_urls = vec!["y\"><script>.png".to_string()];
        let html = render_message(&msg);
        assert!(!html.contains("onerror=\""));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot; onerror=&quot;alert(1)"));
    }

    #[test]
    fn test_thread_name_is_escaped() {
        let html = render_transcript("<b>", Some((1, "<i>")), &[]);
        assert!(html.contains("Transcript of &lt;b&gt;"));
        assert!(html.contains("Name: &lt;i&gt;"));
        assert!(!html.contains("<i>"));
    }
}
