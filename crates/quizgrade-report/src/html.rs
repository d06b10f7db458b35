//! HTML page generator.
//!
//! Produces self-contained pages with all CSS inlined.

use quizgrade_core::model::Question;
use quizgrade_core::summary::SummaryReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Wrap `body` in the shared document shell.
fn layout(title: &str, body: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>");
    html
}

/// Landing page: explains the interview and starts a fresh session.
pub fn intro_page(subject: &str, total: usize) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<h1>{} Mock Interview</h1>\n",
        html_escape(subject)
    ));
    body.push_str(&format!(
        "<p>You will be asked <strong>{total}</strong> question{}. \
         Each answer is scored from 0 to 5 against a rubric, and you get \
         written feedback at the end.</p>\n",
        if total == 1 { "" } else { "s" }
    ));
    if total == 0 {
        body.push_str("<p class=\"alert warning\">No questions are loaded.</p>\n");
    }
    body.push_str("<form method=\"post\" action=\"/\">\n");
    body.push_str("<button type=\"submit\">Start interview</button>\n");
    body.push_str("</form>\n");
    layout(&format!("{subject} Mock Interview"), &body)
}

/// One question with its progress bar and answer form.
pub fn question_page(question: &Question, number: usize, total: usize, progress: u8) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<p class=\"meta\">Question {number} of {total}</p>\n\
         <div class=\"progress\" role=\"progressbar\" aria-valuenow=\"{progress}\" \
         aria-valuemin=\"0\" aria-valuemax=\"100\"><div style=\"width: {progress}%\"></div></div>\n"
    ));
    body.push_str(&format!(
        "<h2>{}</h2>\n",
        html_escape(&question.question)
    ));
    body.push_str("<form method=\"post\" action=\"/question\">\n");
    // Zero-based position of this question.
    body.push_str(&format!(
        "<input type=\"hidden\" name=\"index\" value=\"{}\">\n",
        number.saturating_sub(1)
    ));
    body.push_str(
        "<textarea name=\"answer\" rows=\"8\" placeholder=\"Type your answer\" autofocus></textarea>\n",
    );
    let label = if number == total { "Finish" } else { "Next" };
    body.push_str(&format!("<button type=\"submit\">{label}</button>\n"));
    body.push_str("</form>\n");
    layout(&format!("Question {number} of {total}"), &body)
}

/// Final report with per-question feedback.
///
/// `log_id` is `None` for a session that still has questions to answer.
pub fn summary_page(report: &SummaryReport, log_id: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Interview Summary</h1>\n");
    body.push_str(&format!(
        "<p class=\"alert {}\">Overall: <strong>{:.1}/5</strong> ({})</p>\n",
        report.band.severity(),
        report.average,
        report.band
    ));

    body.push_str("<table class=\"results\">\n");
    body.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Score</th><th>Feedback</th></tr></thead>\n");
    body.push_str("<tbody>\n");
    for (i, item) in report.items.iter().enumerate() {
        let (score, rationale) = match &item.evaluation {
            Some(e) => (format!("{:.1}", e.score), html_escape(&e.rationale)),
            None => ("-".to_string(), "Not answered".to_string()),
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"answer\">{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            html_escape(&item.question),
            html_escape(&item.answer),
            score,
            rationale
        ));
    }
    body.push_str("</tbody></table>\n");

    match log_id {
        Some(id) => body.push_str(&format!(
            "<p class=\"meta\">Transcript and feedback saved as <code>{}</code>.</p>\n",
            html_escape(id)
        )),
        None => body.push_str(
            "<p class=\"meta\">Some questions are still unanswered. \
             <a href=\"/question\">Continue the interview</a> to save your transcript.</p>\n",
        ),
    }
    body.push_str("<form method=\"post\" action=\"/\">\n");
    body.push_str("<button type=\"submit\">Start again</button>\n");
    body.push_str("</form>\n");
    layout("Interview Summary", &body)
}

/// Error page for failed requests.
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"alert warning\">{}</p>\n<p><a href=\"/\">Back to start</a></p>\n",
        html_escape(title),
        html_escape(message)
    );
    layout(title, &body)
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --accent: #2563eb;
        --success: #dcfce7; --info: #dbeafe; --warning: #fef3c7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --accent: #60a5fa;
          --success: #064e3b; --info: #1e3a8a; --warning: #78350f; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
main { max-width: 56rem; margin: 0 auto; }
.meta { color: #6b7280; }
.progress { height: 0.5rem; background: var(--border); border-radius: 4px; overflow: hidden; }
.progress > div { height: 100%; background: var(--accent); }
textarea { width: 100%; box-sizing: border-box; padding: 0.75rem; font: inherit; border: 1px solid var(--border); border-radius: 8px; background: var(--bg); color: var(--fg); }
button { margin-top: 1rem; padding: 0.5rem 1.5rem; font: inherit; border: 0; border-radius: 8px; background: var(--accent); color: #fff; cursor: pointer; }
.alert { padding: 1rem; border-radius: 8px; }
.alert.success { background: var(--success); }
.alert.info { background: var(--info); }
.alert.warning { background: var(--warning); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
td.answer { white-space: pre-wrap; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
"#;
