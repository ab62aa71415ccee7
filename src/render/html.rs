use super::fields::Field;
use super::table::{Row, Table, UNAVAILABLE_TEXT};
use crate::error::AstroError;
use std::fmt::Write;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_table(table: &Table) -> String {
    let mut out = String::from("<div class=\"astro-almanac-wrapper\">\n<table class=\"astro-almanac-table\">\n<thead><tr>");
    for header in table.headers() {
        let _ = write!(out, "<th>{}</th>", escape_html(header));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        out.push_str("<tr>");
        match row {
            Row::Day { cells, .. } => {
                for cell in cells {
                    if cell.field == Field::MoonPhase {
                        let _ = write!(out, "<td class=\"moon-phase\">{}</td>", escape_html(&cell.text));
                    } else {
                        let _ = write!(out, "<td>{}</td>", escape_html(&cell.text));
                    }
                }
            }
            Row::Unavailable { span, .. } => {
                let _ = write!(
                    out,
                    "<td class=\"astro-unavailable\" colspan=\"{}\">{}</td>",
                    span,
                    escape_html(UNAVAILABLE_TEXT)
                );
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</div>\n");
    out
}

pub fn render_error(error: &AstroError) -> String {
    format!(
        "<div class=\"astro-almanac-error\">{}</div>\n",
        escape_html(&error.user_message())
    )
}
