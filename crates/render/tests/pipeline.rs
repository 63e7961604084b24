use blogmark_core::FrontMatter;
use blogmark_render::{
    HeadingRecord, Pipeline, RenderMode, enhance_post, extract_headings, render_markdown,
};
use proptest::prelude::*;

fn heading(id: &str, text: &str, level: u8) -> HeadingRecord {
    HeadingRecord {
        id: id.to_string(),
        text: text.to_string(),
        level,
    }
}

/// Decoded text of the first `<code class="language-{lang}">` element.
fn code_text(html: &str, lang: &str) -> Option<String> {
    let open = format!("<code class=\"language-{}\">", lang);
    let start = html.find(&open)? + open.len();
    let end = start + html[start..].find("</code>")?;
    Some(html_escape::decode_html_entities(&html[start..end]).into_owned())
}

#[test]
fn outline_of_mixed_levels() {
    let rendered = render_markdown("# T\n\n## A\n\n### B\n\n## A");
    assert_eq!(
        rendered.headings,
        vec![heading("a", "A", 2), heading("b", "B", 3), heading("a-2", "A", 2)]
    );
    insta::assert_snapshot!(
        serde_json::to_string(&rendered.headings).unwrap(),
        @r#"[{"id":"a","text":"A","level":2},{"id":"b","text":"B","level":3},{"id":"a-2","text":"A","level":2}]"#
    );
}

#[test]
fn outline_matches_anchor_ids() {
    let rendered = render_markdown("## Setup\n\n### Setup\n\n## Why *Rust*?");
    for record in &rendered.headings {
        assert!(
            rendered
                .html
                .contains(&format!("<a href=\"#{}\" class=\"anchor\">", record.id)),
            "no anchor for {:?}",
            record
        );
    }
    assert_eq!(
        rendered.headings,
        vec![
            heading("setup", "Setup", 2),
            heading("setup-2", "Setup", 3),
            heading("why-rust", "Why Rust?", 2),
        ]
    );
}

#[test]
fn local_image_without_alt() {
    let rendered = render_markdown("![](local.png)");
    insta::assert_snapshot!(
        rendered.html,
        @r#"<p><img alt="" data-next-image="true" data-src="local.png" loading="lazy" width="800" height="600"></p>"#
    );
}

#[test]
fn reading_time_of_long_post() {
    let body = vec!["word"; 450].join(" ");
    let post = enhance_post(FrontMatter::default(), &body);
    assert_eq!(post.meta.reading_time.minutes, 2);
    assert_eq!(post.meta.reading_time.words, 450);
    assert_eq!(post.meta.reading_time.text, "2 min read");
}

#[test]
fn embeds_and_diagrams_together() {
    let body = "Intro [asciinema:demo1] text.\n\n```asciinema\ncast-id: demo2\nloop: true\n```\n\n```mermaid\npie\n```\n\n```asciinema\ntheme: x\n```";
    let rendered = render_markdown(body);
    assert_eq!(rendered.mode, RenderMode::Enriched);
    assert_eq!(rendered.html.matches("class=\"asciinema-embed\"").count(), 2);
    assert!(rendered.html.contains("data-cast-id=\"demo2\" data-loop=\"true\""));
    assert!(rendered.html.contains("<div class=\"mermaid-placeholder\" data-mermaid=\"pie\">"));
    assert!(rendered.html.contains("<div class=\"asciinema-error\">"));
    assert_eq!(rendered.diagnostics.warnings.len(), 1);
}

#[test]
fn shortcode_inside_code_is_literal() {
    let rendered = render_markdown("```text\n[asciinema:abc]\n```");
    assert_eq!(code_text(&rendered.html, "text").as_deref(), Some("[asciinema:abc]"));
    assert!(!rendered.html.contains("asciinema-embed"));
}

#[test]
fn outline_ignores_headings_inside_code() {
    let html = render_markdown("```html\n<h2>Not a heading</h2>\n```\n\n## Real").html;
    assert_eq!(extract_headings(&html), vec![heading("real", "Real", 2)]);
}

#[test]
fn image_without_source_gets_placeholder() {
    let rendered = render_markdown("![Diagram]()\n\n![ok](ok.png)");
    assert_eq!(rendered.mode, RenderMode::Enriched);
    assert!(rendered.html.contains("src=\"data:image/svg+xml,"));
    assert!(rendered.html.contains("alt=\"Missing image\""));
    assert!(rendered.html.contains("data-error=\"missing-src\""));
    assert!(rendered.html.contains("data-src=\"ok.png\""));
    assert_eq!(rendered.diagnostics.warnings.len(), 1);
}

#[test]
fn one_pipeline_renders_on_many_threads() {
    let pipeline = Pipeline::default();
    let bodies: Vec<String> = (0..8)
        .map(|n| format!("## Part {n}\n\n## Part {n}\n\n![](img-{n}.png)"))
        .collect();

    let shared = &pipeline;
    let outputs: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = bodies
            .iter()
            .map(|body| scope.spawn(move || shared.render(body)))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for (n, rendered) in outputs.iter().enumerate() {
        assert_eq!(rendered.html, pipeline.render(&bodies[n]).html);
        let ids: Vec<_> = rendered.headings.iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec![format!("part-{n}"), format!("part-{n}-2")]);
        assert!(rendered.html.contains(&format!("data-src=\"img-{n}.png\"")));
    }
}

fn heading_text() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,2}"
}

fn prose() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,10}( [A-Za-z]{1,10}){0,3}"
}

proptest! {
    #[test]
    fn outline_is_level_two_and_three_subsequence(
        headings in prop::collection::vec((1u8..=4, heading_text()), 0..12)
    ) {
        let body = headings
            .iter()
            .map(|(level, text)| format!("{} {}", "#".repeat(*level as usize), text))
            .collect::<Vec<_>>()
            .join("\n\n");
        let rendered = render_markdown(&body);

        let expected: Vec<(u8, String)> = headings
            .iter()
            .filter(|(level, _)| *level == 2 || *level == 3)
            .cloned()
            .collect();
        let actual: Vec<(u8, String)> = rendered
            .headings
            .iter()
            .map(|h| (h.level, h.text.clone()))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn duplicate_headings_get_counted_suffixes(word in "[a-z]{1,10}", count in 1usize..8) {
        let body = vec![format!("## {}", word); count].join("\n\n");
        let ids: Vec<String> = render_markdown(&body)
            .headings
            .into_iter()
            .map(|h| h.id)
            .collect();
        let expected: Vec<String> = (1..=count)
            .map(|n| if n == 1 { word.clone() } else { format!("{}-{}", word, n) })
            .collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn code_blocks_round_trip_verbatim(
        lang in "[a-z]{1,6}",
        lines in prop::collection::vec((0usize..=8, "[a-z\"&<>]{1,10}"), 1..10)
    ) {
        let code = lines
            .iter()
            .map(|(depth, content)| format!("{}{}", "  ".repeat(*depth), content))
            .collect::<Vec<_>>()
            .join("\n");
        let body = format!("Before.\n\n```{}\n{}\n```\n\nAfter.", lang, code);
        let rendered = render_markdown(&body);
        prop_assert_eq!(code_text(&rendered.html, &lang), Some(code));
    }

    #[test]
    fn local_images_are_deferred(
        path in "[a-z]{1,8}(/[a-z]{1,8}){0,2}\\.png",
        alt in "([A-Za-z]{1,8}( [A-Za-z]{1,8})?)?"
    ) {
        let html = render_markdown(&format!("![{}]({})", alt, path)).html;
        prop_assert!(html.contains("data-next-image=\"true\""));
        let data_src = format!("data-src=\"{}\"", path);
        let alt_attr = format!("alt=\"{}\"", alt);
        prop_assert!(html.contains(&data_src));
        prop_assert!(html.contains(&alt_attr));
        prop_assert!(html.contains("loading=\"lazy\""));
        prop_assert!(html.contains("width=\"800\" height=\"600\""));
        prop_assert!(!html.contains(" src="));
    }

    #[test]
    fn cloudinary_images_keep_src(
        account in "[a-z]{1,8}",
        name in "[a-z]{1,8}"
    ) {
        let url = format!("https://res.cloudinary.com/{}/image/upload/{}.jpg", account, name);
        let html = render_markdown(&format!("![photo]({})", url)).html;
        let src = format!("src=\"{}\"", url);
        prop_assert!(html.contains(&src));
        prop_assert!(html.contains("data-cloudinary=\"true\""));
        prop_assert!(!html.contains("data-next-image"));
    }

    #[test]
    fn shortcode_sits_between_surrounding_text(
        before in prose(),
        id in "[A-Za-z0-9]{1,10}",
        after in prose()
    ) {
        let html = render_markdown(&format!("{} [asciinema:{}] {}", before, id, after)).html;
        prop_assert_eq!(html.matches("class=\"asciinema-embed\"").count(), 1);

        let marker = format!("data-cast-id=\"{}\"", id);
        let before_text = format!("<p>{} ", before);
        let after_text = format!(" {}</p>", after);
        let before_at = html.find(&before_text);
        let marker_at = html.find(&marker);
        let after_at = html.rfind(&after_text);
        prop_assert!(before_at.is_some() && marker_at.is_some() && after_at.is_some(), "{}", html);
        prop_assert!(before_at < marker_at && marker_at < after_at, "{}", html);
    }
}
