//! Annotation block extraction
//!
//! Stylesheets group related custom properties in comment-delimited regions:
//!
//! ```css
//! /* @start colorPalette */
//! :root {
//!   --brand-blue: #336699;
//! }
//! /* @end */
//! ```
//!
//! [`extract_blocks`] turns source text into the ordered list of those regions.
//! Text outside any region is ignored. Inside a region, rules (including nested
//! ones such as `@media`) and bare declarations are collected; comments are skipped.
//! Tokenizing follows CSS Syntax Level 3 through `cssparser`, so strings,
//! unquoted `url()` values and `{}` blocks in custom properties stay intact.

use crate::error::{Result, TokenDocError};
use crate::types::{AnnotationBlock, BlockNode, CssDeclaration, BLOCK_END_MARKER, BLOCK_START_MARKER};
use crate::utils::split_important;
use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, ParseErrorKind,
    Parser, ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    SourceLocation, Token,
};

type CssResult<'i, T> = std::result::Result<T, ParseError<'i, TokenDocError>>;

/// A `@start` marker still waiting for its `@end`
struct OpenBlock {
    name: String,
    line: usize,
    content_start: usize,
    /// 0-based line on which the block content begins
    content_line: usize,
}

/// Split source text into its annotation blocks, in file order.
///
/// Markers are recognized among the top-level tokens of the stylesheet.
pub fn extract_blocks(source: &str, file: &str) -> Result<Vec<AnnotationBlock>> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut blocks = Vec::new();
    let mut open: Option<OpenBlock> = None;

    loop {
        let token_start = parser.position().byte_index();
        let line = parser.current_source_location().line as usize + 1;
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Comment(body) => {
                let comment = &source[token_start..parser.position().byte_index()];
                if comment.len() < 4 || !comment.ends_with("*/") {
                    return Err(TokenDocError::parse(file, line, "unterminated comment"));
                }
                let body = body.trim();
                if let Some(name) = marker_argument(body, BLOCK_START_MARKER) {
                    if let Some(block) = &open {
                        return Err(TokenDocError::parse(
                            file,
                            line,
                            format!(
                                "annotation block '{}' starts inside block '{}' opened at line {}",
                                name, block.name, block.line
                            ),
                        ));
                    }
                    if name.is_empty() {
                        return Err(TokenDocError::parse(
                            file,
                            line,
                            format!("'{}' is missing a block name", BLOCK_START_MARKER),
                        ));
                    }
                    log::trace!("{}:{}: opening annotation block '{}'", file, line, name);
                    open = Some(OpenBlock {
                        name: name.to_string(),
                        line,
                        content_start: parser.position().byte_index(),
                        content_line: parser.current_source_location().line as usize,
                    });
                } else if marker_argument(body, BLOCK_END_MARKER).is_some() {
                    let block = open.take().ok_or_else(|| {
                        TokenDocError::parse(
                            file,
                            line,
                            format!("'{}' without a matching '{}'", BLOCK_END_MARKER, BLOCK_START_MARKER),
                        )
                    })?;
                    let content = &source[block.content_start..token_start];
                    let nodes = parse_block_content(content, block.content_line, file)?;
                    blocks.push(AnnotationBlock {
                        name: block.name,
                        nodes,
                        line: block.line,
                    });
                }
            }
            Token::CloseCurlyBracket if open.is_some() => {
                return Err(TokenDocError::parse(file, line, "unexpected '}' inside annotation block"));
            }
            Token::CurlyBracketBlock
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::Function(_) => skip_block(&mut parser),
            _ => {}
        }
    }

    if let Some(block) = open {
        return Err(TokenDocError::parse(
            file,
            block.line,
            format!("annotation block '{}' is never closed with '{}'", block.name, BLOCK_END_MARKER),
        ));
    }

    log::debug!("{}: extracted {} annotation blocks", file, blocks.len());
    Ok(blocks)
}

/// Returns the text following `marker` when the comment body is that marker
fn marker_argument<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(marker)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// Consume the block whose opening token was just returned
fn skip_block<'i>(parser: &mut Parser<'i, '_>) {
    let _ = parser.parse_nested_block(|block| -> std::result::Result<(), ParseError<'i, ()>> {
        while block.next_including_whitespace_and_comments().is_ok() {}
        Ok(())
    });
}

/// Consume the rest of `input`, returning its source text and whether it held a `{}` block
fn consume_raw<'i>(input: &mut Parser<'i, '_>) -> (&'i str, bool) {
    let start = input.position();
    let mut has_block = false;
    while let Ok(token) = input.next_including_whitespace_and_comments() {
        has_block |= matches!(token, Token::CurlyBracketBlock);
    }
    (input.slice_from(start), has_block)
}

fn parse_block_content(content: &str, first_line: usize, file: &str) -> Result<Vec<BlockNode>> {
    let mut input = ParserInput::new(content);
    let mut parser = Parser::new(&mut input);
    let mut body = BodyParser { file, first_line };
    let mut nodes = Vec::new();

    for item in RuleBodyParser::new(&mut parser, &mut body) {
        match item {
            Ok(BodyItem::Declaration(decl)) => nodes.push(BlockNode::Declaration(decl)),
            Ok(BodyItem::Rule {
                selector,
                declarations,
                line,
            }) => nodes.push(BlockNode::Rule {
                selector,
                declarations,
                line,
            }),
            Ok(BodyItem::Statement) => {}
            Err((error, slice)) => return Err(into_error(error, slice, file, first_line)),
        }
    }

    Ok(nodes)
}

fn into_error(error: ParseError<'_, TokenDocError>, slice: &str, file: &str, first_line: usize) -> TokenDocError {
    let line = first_line + error.location.line as usize + 1;
    match error.kind {
        ParseErrorKind::Custom(inner) => inner,
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => TokenDocError::parse(
            file,
            line,
            format!("expected 'property: value', found '{}'", slice.trim()),
        ),
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => TokenDocError::parse(
            file,
            line,
            format!("unexpected {:?} in '{}'", token, slice.trim()),
        ),
        ParseErrorKind::Basic(kind) => {
            TokenDocError::parse(file, line, format!("{:?} in '{}'", kind, slice.trim()))
        }
    }
}

enum BodyItem {
    Declaration(CssDeclaration),
    /// A qualified rule or block at-rule, nested rules already flattened
    Rule {
        selector: String,
        declarations: Vec<CssDeclaration>,
        line: usize,
    },
    /// At-rule statement such as `@import`; carries no declaration
    Statement,
}

/// Rule body parser shared by block content and every nested rule
struct BodyParser<'a> {
    file: &'a str,
    first_line: usize,
}

impl BodyParser<'_> {
    fn line(&self, location: SourceLocation) -> usize {
        self.first_line + location.line as usize + 1
    }

    fn flattened_declarations<'i>(&mut self, input: &mut Parser<'i, '_>) -> CssResult<'i, Vec<CssDeclaration>> {
        let (file, first_line) = (self.file, self.first_line);
        let mut declarations = Vec::new();

        for item in RuleBodyParser::new(input, self) {
            match item {
                Ok(BodyItem::Declaration(decl)) => declarations.push(decl),
                Ok(BodyItem::Rule { declarations: nested, .. }) => declarations.extend(nested),
                Ok(BodyItem::Statement) => {}
                Err((error, slice)) => {
                    let location = error.location;
                    return Err(ParseError {
                        kind: ParseErrorKind::Custom(into_error(error, slice, file, first_line)),
                        location,
                    });
                }
            }
        }

        Ok(declarations)
    }
}

impl<'i> DeclarationParser<'i> for BodyParser<'_> {
    type Declaration = BodyItem;
    type Error = TokenDocError;

    fn parse_value<'t>(&mut self, name: CowRcStr<'i>, input: &mut Parser<'i, 't>) -> CssResult<'i, BodyItem> {
        let line = self.line(input.current_source_location());
        let (raw_value, has_block) = consume_raw(input);

        // Only custom properties may hold a `{}` block; anything else is a nested rule
        if has_block && !name.starts_with("--") {
            return Err(input.new_custom_error(TokenDocError::parse(
                self.file,
                line,
                format!("'{}' is not a custom property and cannot hold a block", name),
            )));
        }

        let (value, important) = split_important(raw_value);
        Ok(BodyItem::Declaration(CssDeclaration {
            prop: name.to_string(),
            value,
            important,
            line,
        }))
    }
}

impl<'i> QualifiedRuleParser<'i> for BodyParser<'_> {
    type Prelude = (String, usize);
    type QualifiedRule = BodyItem;
    type Error = TokenDocError;

    fn parse_prelude<'t>(&mut self, input: &mut Parser<'i, 't>) -> CssResult<'i, Self::Prelude> {
        let line = self.line(input.current_source_location());
        let (selector, _) = consume_raw(input);
        Ok((selector.trim().to_string(), line))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> CssResult<'i, BodyItem> {
        let (selector, line) = prelude;
        let declarations = self.flattened_declarations(input)?;
        Ok(BodyItem::Rule {
            selector,
            declarations,
            line,
        })
    }
}

impl<'i> AtRuleParser<'i> for BodyParser<'_> {
    type Prelude = (String, usize);
    type AtRule = BodyItem;
    type Error = TokenDocError;

    fn parse_prelude<'t>(&mut self, name: CowRcStr<'i>, input: &mut Parser<'i, 't>) -> CssResult<'i, Self::Prelude> {
        let line = self.line(input.current_source_location());
        let (prelude, _) = consume_raw(input);
        let selector = format!("@{} {}", name, prelude.trim());
        Ok((selector.trim_end().to_string(), line))
    }

    fn rule_without_block(&mut self, _prelude: Self::Prelude, _start: &ParserState) -> std::result::Result<BodyItem, ()> {
        Ok(BodyItem::Statement)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> CssResult<'i, BodyItem> {
        let (selector, line) = prelude;
        let declarations = self.flattened_declarations(input)?;
        Ok(BodyItem::Rule {
            selector,
            declarations,
            line,
        })
    }
}

impl<'i> RuleBodyItemParser<'i, BodyItem, TokenDocError> for BodyParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(block: &AnnotationBlock) -> Vec<(&str, &str)> {
        block
            .walk_declarations()
            .map(|d| (d.prop.as_str(), d.value.as_str()))
            .collect()
    }

    #[test]
    fn test_blocks_in_file_order() {
        let css = r#"
.ignored { color: red; }

/* @start colorPalette */
:root {
  --brand-blue: #336699;
  --brand-red: #cc0000;
}
/* @end */

/* @start spacing */
:root { --space-small: 4px; --space-large: 16px }
/* @end */
"#;
        let blocks = extract_blocks(css, "vars.css").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "colorPalette");
        assert!(blocks[0].is_color_palette());
        assert_eq!(
            props(&blocks[0]),
            vec![("--brand-blue", "#336699"), ("--brand-red", "#cc0000")]
        );
        assert_eq!(blocks[1].name, "spacing");
        assert_eq!(
            props(&blocks[1]),
            vec![("--space-small", "4px"), ("--space-large", "16px")]
        );
    }

    #[test]
    fn test_empty_block_is_valid() {
        let blocks = extract_blocks("/* @start empty */\n/* @end */", "e.css").unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].nodes.is_empty());
    }

    #[test]
    fn test_comments_strings_and_parens_inside_block() {
        let css = r#"/* @start misc */
:root {
  /* a note; with a semicolon */
  --font-stack: "Helvetica; Neue", sans-serif;
  --icon: url(data:image/svg+xml;base64,AAAA);
  --accent: var(--brand-blue) !important;
}
/* @end */"#;
        let blocks = extract_blocks(css, "misc.css").unwrap();
        let decls: Vec<_> = blocks[0].walk_declarations().collect();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].value, "\"Helvetica; Neue\", sans-serif");
        assert_eq!(decls[1].value, "url(data:image/svg+xml;base64,AAAA)");
        assert_eq!(decls[2].value, "var(--brand-blue)");
        assert!(decls[2].important);
        assert_eq!(decls[2].line, 6);
    }

    #[test]
    fn test_nested_rules_are_flattened() {
        let css = "/* @start theme */\n@media (min-width: 10px) { :root { --gap: 2px; } }\n--loose: 1;\n/* @end */";
        let blocks = extract_blocks(css, "t.css").unwrap();
        assert_eq!(blocks[0].nodes.len(), 2);
        assert_eq!(props(&blocks[0]), vec![("--gap", "2px"), ("--loose", "1")]);
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let err = extract_blocks("/* @start colors */\n:root { --a: 1; }", "bad.css").unwrap_err();
        match err {
            TokenDocError::Parse { file, line, .. } => {
                assert_eq!(file, "bad.css");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_delimiters() {
        assert!(extract_blocks("/* @end */", "a.css").is_err());
        assert!(extract_blocks("/* @start */ /* @end */", "a.css").is_err());
        assert!(extract_blocks("/* @start a */ /* @start b */ /* @end */ /* @end */", "a.css").is_err());
        assert!(extract_blocks("/* @start a */ :root { --x: 1;", "a.css").is_err());
        assert!(extract_blocks("/* @start a */ --x: 1; } /* @end */", "a.css").is_err());
        assert!(extract_blocks("/* @start a", "a.css").is_err());
        assert!(extract_blocks("/* @start a */ /* @end */\n/* dangling", "a.css").is_err());
    }

    #[test]
    fn test_marker_requires_word_boundary() {
        // "@ending" is an ordinary comment, so the block stays open
        let err = extract_blocks("/* @start a */ /* @ending */", "a.css");
        assert!(err.is_err());
    }

    #[test]
    fn test_block_valued_custom_property_is_one_entry() {
        let css = "/* @start x */ :root { --mixin: { color: red; }; --c: 1; } /* @end */";
        let blocks = extract_blocks(css, "apply.css").unwrap();
        assert_eq!(
            props(&blocks[0]),
            vec![("--mixin", "{ color: red; }"), ("--c", "1")]
        );
    }

    #[test]
    fn test_comment_opener_inside_unquoted_url() {
        let css = "/* @start x */\n:root { --bg: url(img/*.png); --c: 1; }\n/* @end */";
        let blocks = extract_blocks(css, "url.css").unwrap();
        assert_eq!(props(&blocks[0]), vec![("--bg", "url(img/*.png)"), ("--c", "1")]);
    }

    #[test]
    fn test_nested_selector_is_not_a_declaration() {
        let css = "/* @start x */\n:root { --a: 1; a:hover { --b: 2; } }\n/* @end */";
        let blocks = extract_blocks(css, "nest.css").unwrap();
        assert_eq!(props(&blocks[0]), vec![("--a", "1"), ("--b", "2")]);
    }

    #[test]
    fn test_statements_and_text_outside_blocks() {
        let css = r#"@import url("base.css");
.banner::after { content: "/* @start fake */"; }
/* @start real */
@import url("inner.css");
:root { --z: 0 }
/* @end */
"#;
        let blocks = extract_blocks(css, "s.css").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "real");
        assert_eq!(blocks[0].line, 3);
        assert_eq!(props(&blocks[0]), vec![("--z", "0")]);
    }

    #[test]
    fn test_error_lines_count_from_file_start() {
        let css = "\n\n/* @start a */\n:root {\n  --ok: 1;\n  bogus;\n}\n/* @end */";
        let err = extract_blocks(css, "a.css").unwrap_err();
        assert!(matches!(err, TokenDocError::Parse { line: 6, .. }));
    }

    #[test]
    fn test_declaration_without_colon() {
        let err = extract_blocks("/* @start a */\n:root { nonsense; }\n/* @end */", "a.css").unwrap_err();
        assert!(matches!(err, TokenDocError::Parse { line: 2, .. }));
    }
}
