//! Token definitions
//!
//! The lexer is generated by Logos. Whitespace and both C comment styles are
//! skipped; everything between `{%` and `%}` is captured as a single raw
//! token so the payload never touches the grammar.

use logos::Logos;

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
// Equivalent to `/\*([^*]|\*+[^*/])*\*+/`, rewritten because logos
// miscompiles alternation-in-loop patterns of that shape.
#[logos(skip r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
pub enum Token<'a> {
    #[token("namespace")]
    Namespace,

    #[token("template")]
    Template,

    #[token("import")]
    Import,

    #[token("nest")]
    Nest,

    #[token("with")]
    With,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Eq,

    #[regex(r"[a-zA-Z_][0-9a-zA-Z_]*", |lex| lex.slice())]
    Identifier(&'a str),

    /// A `{% ... %}` block, delimiters included. The payload may span lines
    /// and contain anything except a closing `%}`.
    // Equivalent to `\{%([^%]|%+[^}%])*%+\}`, rewritten because logos
    // miscompiles alternation-in-loop patterns of that shape.
    #[regex(r"\{%[^%]*%+([^}%][^%]*%+)*\}", |lex| lex.slice())]
    Raw(&'a str),
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Namespace => write!(f, "namespace"),
            Token::Template => write!(f, "template"),
            Token::Import => write!(f, "import"),
            Token::Nest => write!(f, "nest"),
            Token::With => write!(f, "with"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Eq => write!(f, "="),
            Token::Identifier(id) => write!(f, "{}", id),
            Token::Raw(_) => write!(f, "{{% ... %}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token<'_>> {
        Token::lexer(src).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        assert_eq!(
            lex("namespace ns { template t() {} }"),
            vec![
                Token::Namespace,
                Token::Identifier("ns"),
                Token::LBrace,
                Token::Template,
                Token::Identifier("t"),
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn raw_block_spans_lines() {
        let toks = lex("{% int x;\nint y; %}");
        assert_eq!(toks, vec![Token::Raw("{% int x;\nint y; %}")]);
    }

    #[test]
    fn raw_block_tolerates_stray_percent() {
        let toks = lex("{% a % b %}");
        assert_eq!(toks, vec![Token::Raw("{% a % b %}")]);
    }

    #[test]
    fn comments_are_skipped() {
        let toks = lex("// line\nnest /* block\ncomment */ t");
        assert_eq!(toks, vec![Token::Nest, Token::Identifier("t")]);
    }

    #[test]
    fn dotted_path() {
        assert_eq!(
            lex("a.b.c"),
            vec![
                Token::Identifier("a"),
                Token::Dot,
                Token::Identifier("b"),
                Token::Dot,
                Token::Identifier("c"),
            ]
        );
    }
}
