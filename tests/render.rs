//! Integration tests for rendering templates against bindings

use std::io::Write;

use pretty_assertions::assert_eq;

use tmplwalk::{
    render, render_to_string, render_with_config, FormatRegistry, Loop, RenderConfig,
    RenderError, Scope, Source, TagKind, TagSet,
};

fn render_ok(template: &str, scope: &Scope) -> String {
    render_to_string(template, &FormatRegistry::with_builtins(), scope).expect("Should render")
}

fn rows(name: &str, values: &[&str]) -> Loop {
    values
        .iter()
        .map(|value| Scope::new().with_var(name, *value))
        .collect()
}

#[test]
fn test_text_without_tags_is_unchanged() {
    let input = "plain text\n  with <b>markup</b> and { braces }\r\nand a \\ backslash\n";
    assert_eq!(render_ok(input, &Scope::new()), input);
}

#[test]
fn test_line_continuation_in_template() {
    let input = "{{IF x}}\\\nyes\\\n{{ENDIF}}\\\\\nend";
    let scope = Scope::new().with_var("x", "1");
    assert_eq!(render_ok(input, &scope), "yes\\\nend");
}

#[test]
fn test_variable_resolution() {
    let template = r#"Hello, {{VAR name="user" default="guest"}}!"#;
    assert_eq!(
        render_ok(template, &Scope::new().with_var("user", "Amy")),
        "Hello, Amy!"
    );
    assert_eq!(render_ok(template, &Scope::new()), "Hello, guest!");
    assert_eq!(render_ok("[{{VAR missing}}]", &Scope::new()), "[]");
}

#[test]
fn test_variable_value_is_not_escaped_without_formatter() {
    let scope = Scope::new().with_var("html", "<b>&</b>");
    assert_eq!(render_ok("{{VAR html}}", &scope), "<b>&</b>");
    assert_eq!(
        render_ok("{{VAR html fmt=entity}}", &scope),
        "&lt;b&gt;&amp;&lt;/b&gt;"
    );
}

#[test]
fn test_custom_formatter() {
    let mut formats = FormatRegistry::new();
    formats.register("upper", |value, out| {
        out.write_all(value.to_uppercase().as_bytes())
    });
    let scope = Scope::new().with_var("x", "shout");
    let out = render_to_string("{{VAR x fmt=upper}}!", &formats, &scope).unwrap();
    assert_eq!(out, "SHOUT!");
}

#[test]
fn test_existence_test() {
    let template = "{{IF x}}T{{ELSE}}F{{ENDIF}}";
    assert_eq!(render_ok(template, &Scope::new().with_var("x", "1")), "T");
    assert_eq!(render_ok(template, &Scope::new().with_var("x", "")), "F");
    assert_eq!(render_ok(template, &Scope::new()), "F");
    assert_eq!(
        render_ok(template, &Scope::new().with_loop("x", rows("n", &["1"]))),
        "T"
    );
}

#[test]
fn test_value_comparison() {
    let template = r#"{{IF name="x" value="5"}}five{{ELSE}}other{{ENDIF}}"#;
    assert_eq!(render_ok(template, &Scope::new().with_var("x", "5")), "five");
    assert_eq!(render_ok(template, &Scope::new().with_var("x", "5 ")), "other");
    assert_eq!(render_ok(template, &Scope::new()), "other");
}

#[test]
fn test_inline_operators_compare_bytes() {
    let scope = Scope::new().with_var("n", "10");
    let template = "{{IF n < 9}}a{{ENDIF}}{{IF n >= 10}}b{{ENDIF}}{{IF n != 10}}c{{ENDIF}}{{IF n > 1}}d{{ENDIF}}";
    assert_eq!(render_ok(template, &scope), "abd");
}

#[test]
fn test_elsif_chain() {
    let template = "{{IF n == 1}}one{{ELSIF n == 2}}two{{ELSIF n}}many{{ELSE}}none{{ENDIF}}";
    let out: Vec<_> = ["1", "2", "3", ""]
        .iter()
        .map(|n| render_ok(template, &Scope::new().with_var("n", *n)))
        .collect();
    assert_eq!(out, vec!["one", "two", "many", "none"]);
}

#[test]
fn test_loop_rows_in_order_with_shadowing() {
    let scope = Scope::new()
        .with_var("n", "outer")
        .with_var("sep", ",")
        .with_loop("items", rows("n", &["1", "2"]));
    assert_eq!(
        render_ok("{{LOOP items}}{{VAR n}}{{VAR sep}}{{ENDLOOP}}{{VAR n}}", &scope),
        "1,2,outer"
    );
}

#[test]
fn test_missing_loop_renders_nothing() {
    assert_eq!(render_ok("a{{LOOP none}}x{{ENDLOOP}}b", &Scope::new()), "ab");
}

#[test]
fn test_nested_loops_see_their_owner() {
    let inner = |values: &[&str]| rows("v", values);
    let scope = Scope::new().with_loop(
        "outer",
        Loop::new()
            .with_row(Scope::new().with_var("k", "a").with_loop("inner", inner(&["1", "2"])))
            .with_row(Scope::new().with_var("k", "b").with_loop("inner", inner(&["3"]))),
    );
    let template = "{{LOOP outer}}{{LOOP inner}}{{VAR k}}{{VAR v}} {{ENDLOOP}}{{ENDLOOP}}";
    assert_eq!(render_ok(template, &scope), "a1 a2 b3 ");
}

#[test]
fn test_break_stops_loop() {
    let scope = Scope::new().with_loop("items", rows("n", &["1", "2", "3"]));
    let template = "{{LOOP items}}{{VAR n}}{{IF n == 2}}{{BREAK}}{{ENDIF}};{{ENDLOOP}}end";
    assert_eq!(render_ok(template, &scope), "1;2end");
}

#[test]
fn test_continue_skips_rest_of_row() {
    let scope = Scope::new().with_loop("items", rows("n", &["1", "2", "3"]));
    let template = "{{LOOP items}}{{IF n == 2}}{{CONTINUE /}}{{ENDIF}}{{VAR n}};{{ENDLOOP}}";
    assert_eq!(render_ok(template, &scope), "1;3;");
}

#[test]
fn test_break_level_two_unwinds_both_loops() {
    let scope = Scope::new().with_loop(
        "outer",
        ["a", "b"]
            .iter()
            .map(|k| {
                Scope::new()
                    .with_var("k", *k)
                    .with_loop("inner", rows("v", &["1", "2"]))
            })
            .collect(),
    );
    let template = "{{LOOP outer}}[{{LOOP inner}}{{VAR k}}{{VAR v}}{{BREAK level=2}}{{ENDLOOP}}]{{ENDLOOP}}done";
    assert_eq!(render_ok(template, &scope), "[a1done");
}

#[test]
fn test_continue_level_two_moves_outer_loop_on() {
    let scope = Scope::new().with_loop(
        "outer",
        ["a", "b"]
            .iter()
            .map(|k| {
                Scope::new()
                    .with_var("k", *k)
                    .with_loop("inner", rows("v", &["1", "2"]))
            })
            .collect(),
    );
    let template = "{{LOOP outer}}[{{LOOP inner}}{{VAR k}}{{VAR v}}{{CONTINUE level=2}}{{ENDLOOP}}]{{ENDLOOP}}done";
    assert_eq!(render_ok(template, &scope), "[a1[b1done");
}

#[test]
fn test_comments_are_dropped() {
    let template = "a{{* note {{VAR x}} *}}b{{!-- VAR x --}}c";
    let scope = Scope::new().with_var("x", "X");
    assert_eq!(render_ok(template, &scope), "abXc");
}

#[test]
fn test_shorthand_forms() {
    let scope = Scope::new()
        .with_var("user", "Amy")
        .with_loop("rows", rows("n", &["1"]));
    assert_eq!(
        render_ok("{{= user}}/{{=user}}/{{VAR 'user'}}/{{LOOP rows}}{{= n}}{{ENDLOOP}}", &scope),
        "Amy/Amy/Amy/1"
    );
}

#[test]
fn test_malformed_tag_recovery() {
    let scope = Scope::new().with_var("a", "A").with_var("b", "B");
    let mut out = Vec::new();
    let mut errout = Vec::new();
    let result = render(
        Source::Text("{{VAR a}} {{VAR default=x}} {{VAR b}}"),
        &FormatRegistry::new(),
        &scope,
        &mut out,
        &mut errout,
    );

    assert_eq!(String::from_utf8(out).unwrap(), "A  B");
    let err = result.unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(String::from_utf8(errout).unwrap().lines().count(), 1);
}

#[test]
fn test_lexically_bad_tag_is_kept_as_text() {
    let result = render_to_string("a {{VARx}} b", &FormatRegistry::new(), &Scope::new());
    let Err(RenderError::Template(diagnostics)) = result else {
        panic!("expected template errors");
    };
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_custom_tag_set() {
    let tags = TagSet::new()
        .with_delimiters("<!", ">")
        .with_comment("<#", "#>")
        .with_keyword(TagKind::Var, "TMPL_VAR")
        .with_keyword(TagKind::Loop, "TMPL_LOOP")
        .with_keyword(TagKind::EndLoop, "/TMPL_LOOP");
    let config = RenderConfig::new().with_tags(tags);
    let scope = Scope::new().with_loop("rows", rows("n", &["1", "2"]));

    let mut out = Vec::new();
    render_with_config(
        Source::Text("<#skip#><!TMPL_LOOP rows><!tmpl_var n>;<!/TMPL_LOOP>{{VAR n}}"),
        &FormatRegistry::new(),
        &scope,
        &mut out,
        &mut std::io::sink(),
        &config,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1;2;{{VAR n}}");
}

#[test]
fn test_unquoted_values_with_dashes() {
    assert_eq!(render_ok("[{{VAR bal default=-1}}]", &Scope::new()), "[-1]");
    assert_eq!(render_ok("[{{VAR bal default=a--b}}]", &Scope::new()), "[a--b]");

    let template = "[{{IF n == -1}}neg{{ELSE}}other{{ENDIF}}]";
    assert_eq!(render_ok(template, &Scope::new().with_var("n", "-1")), "[neg]");
    assert_eq!(render_ok(template, &Scope::new().with_var("n", "1")), "[other]");
}

#[test]
fn test_negative_level_is_dropped() {
    let scope = Scope::new().with_loop("items", rows("n", &["1", "2"]));
    let result = render_to_string(
        "{{LOOP items}}{{VAR n}}{{BREAK level=-1}}{{ENDLOOP}}",
        &FormatRegistry::new(),
        &scope,
    );
    let Err(RenderError::Template(diagnostics)) = result else {
        panic!("expected template errors");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].to_string(),
        "(none):1: ignoring bad BREAK tag (bad \"level=\" attribute \"-1\")"
    );

    let mut out = Vec::new();
    let _ = render(
        Source::Text("{{LOOP items}}{{VAR n}}{{BREAK level=-1}}{{ENDLOOP}}"),
        &FormatRegistry::new(),
        &scope,
        &mut out,
        &mut std::io::sink(),
    );
    assert_eq!(String::from_utf8(out).unwrap(), "12");
}
