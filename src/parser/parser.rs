//! Recursive descent parser for grammar files
//!
//! Builds the typed AST straight from the token slice. Parsing is fail-fast:
//! the first mismatch is returned and nothing after it is looked at.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::ast::*;
use super::lexer::{Token, TokenKind, tokenize};
use super::resolve::resolve;
use crate::base::{Name, Range};
use crate::error::{DuplicateDeclarationError, ParseError, SyntaxError};

type ParseResult<T> = Result<T, SyntaxError>;

/// Parse grammar source into a resolved AST
pub fn parse(input: &str) -> Result<Grammar, SyntaxError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(&tokens);
    let mut grammar = parser.parse_grammar()?;
    resolve(&mut grammar);
    debug!(
        declarations = grammar.declarations.len(),
        tokens = tokens.len(),
        "parsed grammar"
    );
    Ok(grammar)
}

/// The parser state
struct Parser<'t, 'a> {
    /// Always ends with a [`TokenKind::Eof`] token
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Token<'a> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(Token {
                kind: TokenKind::Eof,
                text: "",
                range: Range::from_coords(1, 1, 1, 1),
            })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// End of the most recently consumed token
    fn prev_end(&self) -> crate::base::Position {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.range.end,
            None => self.current().range.start,
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Token<'a> {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) { Some(self.bump()) } else { None }
    }

    /// `extends`, `super` and `throws` are identifiers outside their slot
    fn at_contextual(&self, keyword: &str) -> bool {
        let token = self.current();
        token.kind == TokenKind::Ident && token.text == keyword
    }

    fn eat_contextual(&mut self, keyword: &str) -> bool {
        let found = self.at_contextual(keyword);
        if found {
            self.bump();
        }
        found
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'a>> {
        self.eat(kind)
            .ok_or_else(|| self.unexpected(kind.describe()).into())
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident::new(token.text, token.range))
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.text),
        };
        ParseError::new(
            format!("Unexpected {found}, expected {expected}"),
            token.range.start,
        )
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// Grammar = Declaration* EOF
    fn parse_grammar(&mut self) -> ParseResult<Grammar> {
        let mut declarations: Vec<Declaration> = Vec::new();
        let mut seen: FxHashSet<Name> = FxHashSet::default();
        while !self.at(TokenKind::Eof) {
            let declaration = self.parse_declaration()?;
            let name = &declaration.name;
            if !seen.insert(name.name.clone()) {
                return Err(DuplicateDeclarationError {
                    name: name.name.clone(),
                    position: name.range.start,
                }
                .into());
            }
            declarations.push(declaration);
        }
        Ok(Grammar { declarations })
    }

    /// Declaration = IDENT TypeParameters? ':' Alternation? ';'
    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        let name = self.expect_ident()?;
        let type_params = if self.at(TokenKind::LBracket) {
            self.parse_type_parameters()?
        } else {
            TypeParameters::default()
        };
        self.expect(TokenKind::Colon)?;
        let body = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_alternation()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Declaration {
            name,
            type_params,
            body,
        })
    }

    /// TypeParameters = '[' (TypeParameter (',' TypeParameter)*)? ']'
    /// TypeParameter = IDENT ('extends' TypeReference)?
    ///
    /// A repeated name fails as soon as it is read.
    fn parse_type_parameters(&mut self) -> ParseResult<TypeParameters> {
        self.expect(TokenKind::LBracket)?;
        let mut params = TypeParameters::default();
        if !self.at(TokenKind::RBracket) {
            loop {
                let name = self.expect_ident()?;
                if params.contains(name.as_str()) {
                    return Err(DuplicateDeclarationError {
                        name: name.name,
                        position: name.range.start,
                    }
                    .into());
                }
                let bound = if self.eat_contextual("extends") {
                    Some(self.parse_type_reference()?)
                } else {
                    None
                };
                params.0.push(TypeParameter { name, bound });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(params)
    }

    /// Alternation = Sequence ('|' Sequence)*
    fn parse_alternation(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_sequence()?;
        while self.eat(TokenKind::Pipe).is_some() {
            let right = self.parse_sequence()?;
            left = Expr::Alternation(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// Sequence = Repetition+
    fn parse_sequence(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_repetition()?;
        while self.at_primary() {
            let right = self.parse_repetition()?;
            left = Expr::Sequence(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn at_primary(&self) -> bool {
        matches!(self.current().kind, TokenKind::Ident | TokenKind::LParen)
    }

    /// Repetition = Primary ('*' | '+' | '?')?
    fn parse_repetition(&mut self) -> ParseResult<Expr> {
        let primary = self.parse_primary()?;
        let (min, max) = match self.current().kind {
            TokenKind::Question => (0, Some(1)),
            TokenKind::Star => (0, None),
            TokenKind::Plus => (1, None),
            _ => return Ok(primary),
        };
        let operator = self.bump();
        let range = primary.range().cover(operator.range);
        Ok(Expr::Repetition(Repetition {
            inner: Box::new(primary),
            min,
            max,
            range,
        }))
    }

    /// Primary = MethodCall | TypeReference | '(' Alternation ')'
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current().kind {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_alternation()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::Ident if self.at_method() => Ok(Expr::Method(self.parse_method()?)),
            TokenKind::Ident => Ok(Expr::Reference(self.parse_type_reference()?)),
            _ => Err(self
                .unexpected("method call, rule reference or '('")
                .into()),
        }
    }

    /// `name(` or `name[T`
    fn at_method(&self) -> bool {
        match self.nth(1) {
            TokenKind::LParen => true,
            TokenKind::LBracket => self.nth(2) == TokenKind::Ident,
            _ => false,
        }
    }

    /// MethodCall = IDENT TypeParameters? '(' (Parameter (',' Parameter)*)? ')' Throws?
    /// Throws = 'throws' TypeReference (',' TypeReference)*
    fn parse_method(&mut self) -> ParseResult<MethodCall> {
        let name = self.expect_ident()?;
        let type_params = if self.at(TokenKind::LBracket) {
            self.parse_type_parameters()?
        } else {
            TypeParameters::default()
        };
        self.expect(TokenKind::LParen)?;
        let mut params = FormalParameters::default();
        if !self.at(TokenKind::RParen) {
            loop {
                params.0.push(self.parse_parameter()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let mut throws = Vec::new();
        if self.at_contextual("throws") && self.nth(1) == TokenKind::Ident {
            self.bump();
            loop {
                throws.push(self.parse_type_reference()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let range = Range::new(name.range.start, self.prev_end());
        Ok(MethodCall {
            name,
            type_params,
            params,
            throws,
            range,
        })
    }

    /// Parameter = TypeReference '...'? IDENT?
    fn parse_parameter(&mut self) -> ParseResult<FormalParameter> {
        let ty = self.parse_type_reference()?;
        let var_args = self.eat(TokenKind::Ellipsis).is_some();
        let name = match self.eat(TokenKind::Ident) {
            Some(token) => Some(Ident::new(token.text, token.range)),
            None => None,
        };
        Ok(FormalParameter { ty, var_args, name })
    }

    /// TypeReference = IDENT ('.' IDENT)* TypeArguments? ('[' ']')?
    fn parse_type_reference(&mut self) -> ParseResult<TypeReference> {
        let first = self.expect_ident()?;
        let start = first.range.start;
        let mut segments = vec![first];
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.bump();
            segments.push(self.expect_ident()?);
        }

        let mut args = Vec::new();
        if self.eat(TokenKind::Lt).is_some() {
            loop {
                args.push(self.parse_type_argument()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::Gt)?;
        }

        let is_array = self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket;
        if is_array {
            self.bump();
            self.bump();
        }

        Ok(TypeReference {
            name: QualifiedName(segments),
            args,
            is_array,
            range: Range::new(start, self.prev_end()),
            referent: None,
        })
    }

    /// TypeArgument = TypeReference | '?' (('extends' | 'super') TypeReference)?
    fn parse_type_argument(&mut self) -> ParseResult<TypeArgument> {
        if self.eat(TokenKind::Question).is_none() {
            return Ok(TypeArgument::Type(self.parse_type_reference()?));
        }
        let bound = if self.eat_contextual("extends") {
            WildcardBound::Extends
        } else if self.eat_contextual("super") {
            WildcardBound::Super
        } else {
            return Ok(TypeArgument::Wildcard(None));
        };
        let ty = self.parse_type_reference()?;
        Ok(TypeArgument::Wildcard(Some((bound, Box::new(ty)))))
    }
}
