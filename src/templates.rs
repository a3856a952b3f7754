use askama::Template;

#[derive(Template)]
#[template(
    source = "Do you really want to delete this post?<br>Title: <b>{{ title }}</b>",
    ext = "html"
)]
pub struct DeleteConfirmTemplate<'a> {
    pub title: &'a str,
}

#[derive(Template)]
#[template(
    source = "This post hasn't been saved yet, you cannot delete it",
    ext = "html"
)]
pub struct CannotDeleteTemplate;

#[derive(Template)]
#[template(source = "Do you want to delete all selected posts?", ext = "html")]
pub struct DeleteSelectedTemplate;

// One file input per slot, the selected file name rides along as a data attribute
#[derive(Template)]
#[template(
    source = r#"{% for name in names %}<input class="single-file margin-bottom-1" type="file"{% if !name.is_empty() %} data-file="{{ name }}"{% endif %}>{% endfor %}"#,
    ext = "html"
)]
pub struct FileSlotsTemplate<'a> {
    pub names: &'a [String],
}

#[derive(Template)]
#[template(
    source = r#"<a id="pasty-link" href="{{ link }}">{{ link }}</a>"#,
    ext = "html"
)]
pub struct LinkTemplate<'a> {
    pub link: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_confirmation_escapes_the_title() {
        let body = DeleteConfirmTemplate {
            title: "<script>x</script>",
        }
        .render()
        .unwrap();
        assert!(body.starts_with("Do you really want to delete this post?<br>Title: <b>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn file_slots_render_one_input_each() {
        let names = vec!["notes.txt".to_string(), String::new()];
        let html = FileSlotsTemplate { names: &names }.render().unwrap();
        assert_eq!(html.matches("<input").count(), 2);
        assert!(html.contains(r#"data-file="notes.txt""#));
    }
}
