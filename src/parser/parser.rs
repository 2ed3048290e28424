use log::{debug, warn};

use crate::{
    analyzer::{StringTable, SymbolId, SymbolKind, SymbolTable, ValueType},
    codegen::{Instr, Operand, Tac},
    error::{CompileError, CompileResult},
    lexer::{Lexer, Token, TokenKind},
    Compilation,
};

use super::{local_variables::LocalVariables, state::ParserState};

/// Recursive-descent translator. Parsing, symbol bookkeeping and TAC emission
/// happen in the same walk; nothing is built in between.
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    pub(super) token: Token,
    peeked: Option<Token>,
    pub(super) symbols: SymbolTable,
    pub(super) strings: StringTable,
    pub(super) tac: Tac,
    pub(super) state: ParserState,
    warnings: Vec<String>,
}

impl Parser {
    pub fn new(source: &str, filename: &str) -> CompileResult<Self> {
        let mut parser = Self {
            lexer: Lexer::new(source, filename),
            token: Token::new(TokenKind::Eof, "", 1),
            peeked: None,
            symbols: SymbolTable::new(),
            strings: StringTable::new(),
            tac: Tac::new(),
            state: ParserState::new(),
            warnings: vec![],
        };
        parser.advance()?;
        Ok(parser)
    }

    pub fn parse(mut self) -> CompileResult<Compilation> {
        self.parse_program()?;

        let Some(entry) = self.state.entry.clone() else {
            return Err(CompileError::MissingMain {
                file: self.filename().to_string(),
            });
        };
        self.tac.emit(Instr::Start(entry.clone()));

        Ok(Compilation {
            tac: self.tac,
            symbols: self.symbols,
            strings: self.strings,
            entry,
            warnings: self.warnings,
        })
    }

    pub fn filename(&self) -> &str {
        self.lexer.filename()
    }

    /// Next token from the lexer that is not a comment.
    fn next_significant(&mut self) -> CompileResult<Token> {
        loop {
            let token = self.lexer.next_token()?;
            if !token.is(TokenKind::Comment) {
                return Ok(token);
            }
        }
    }

    pub(super) fn advance(&mut self) -> CompileResult<()> {
        self.token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_significant()?,
        };
        Ok(())
    }

    /// Kind of the token after the current one.
    pub(super) fn peek_kind(&mut self) -> CompileResult<TokenKind> {
        if let Some(token) = &self.peeked {
            return Ok(token.kind);
        }
        let token = self.next_significant()?;
        let kind = token.kind;
        self.peeked = Some(token);
        Ok(kind)
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.token.is(kind)
    }

    pub(super) fn consume(&mut self, kind: TokenKind) -> CompileResult<bool> {
        if !self.check(kind) {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    pub(super) fn mismatch(&self, expected: impl Into<String>) -> CompileError {
        let found = if self.check(TokenKind::Eof) {
            "end of file".to_string()
        } else {
            self.token.kind.name().to_string()
        };
        CompileError::Mismatch {
            file: self.filename().to_string(),
            line: self.token.line,
            expected: expected.into(),
            found,
        }
    }

    /// Matches the current token against `kind` and moves past it. `Eof` is
    /// matched without pulling further.
    pub(super) fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if !self.check(kind) {
            return Err(self.mismatch(kind.name()));
        }
        if kind == TokenKind::Eof {
            return Ok(self.token.clone());
        }
        let matched = self.token.clone();
        self.advance()?;
        Ok(matched)
    }

    pub(super) fn expect_ident(&mut self) -> CompileResult<String> {
        Ok(self.expect(TokenKind::Identifier)?.lexeme)
    }

    /// Matches `(` of a parameter list: a new depth owned by `method`, with
    /// offsets growing upward from the frame base.
    pub(super) fn open_params(&mut self, method: SymbolId) -> CompileResult<()> {
        self.expect(TokenKind::LeftParen)?;
        self.enter_scope(method, LocalVariables::params());
        self.state.in_params = true;
        Ok(())
    }

    pub(super) fn close_params(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::RightParen)?;
        self.state.in_params = false;
        Ok(())
    }

    /// Matches `{` of a method body. The depth was already opened by the
    /// parameter list; only the cursor moves below the frame base.
    pub(super) fn open_body(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::LeftBrace)?;
        self.state.locals.reset(LocalVariables::locals());
        Ok(())
    }

    /// Matches the `class` keyword, moving to class level.
    pub(super) fn open_class(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Class)?;
        self.state.depth += 1;
        Ok(())
    }

    /// Matches `{` of a class body: `class` becomes the parent of every member.
    pub(super) fn open_class_body(&mut self, class: SymbolId) -> CompileResult<()> {
        self.expect(TokenKind::LeftBrace)?;
        self.state.parent = Some(class);
        self.state.locals.reset(LocalVariables::class_body());
        debug!(
            "class body of {} at depth {}",
            self.symbols[class].name, self.state.depth
        );
        Ok(())
    }

    fn enter_scope(&mut self, owner: SymbolId, locals: LocalVariables) {
        self.state.depth += 1;
        self.state.parent = Some(owner);
        self.state.locals.reset(locals);
        debug!(
            "enter depth {} owned by {}, next offset {}",
            self.state.depth,
            self.symbols[owner].name,
            self.state.locals.get_last_offset()
        );
    }

    /// Matches `}` and closes the innermost open scope.
    pub(super) fn close_scope(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::RightBrace)?;
        self.exit_scope();
        Ok(())
    }

    fn exit_scope(&mut self) {
        let depth = self.state.depth;
        let parent = self.state.parent;

        if let Some(parent) = parent {
            let children = self.symbols.children_print(parent);
            if let Some(symbol) = self.symbols.get_mut(parent) {
                symbol.children = children;
            }
        }
        if let Some(current) = self.state.current.filter(|id| self.symbols.is_live(*id)) {
            let children = self.symbols.children_print(current);
            if let Some(symbol) = self.symbols.get_mut(current) {
                symbol.children = children;
            }
        }

        let parent_symbol = parent.and_then(|id| self.symbols.get(id));
        let offset = parent_symbol.map(|s| s.offset).unwrap_or_default();
        let grandparent = parent_symbol.and_then(|s| s.owner);
        self.state.locals.restore(offset);

        if parent.is_some() && self.state.current_class == parent {
            self.state.current_class = None;
        }
        self.state.current_method = None;

        debug!("leaving depth {}\n{}", depth, self.symbols.write_table(depth));
        self.symbols.delete_depth(depth);
        self.state.depth = depth.saturating_sub(1);
        self.state.parent = grandparent;
    }

    /// Declares `name` in the open scope.
    ///
    /// Lays the record out at the cursor (class-level names and constants stay
    /// at offset 0) and charges its size to the owner: to the parameter total
    /// while a parameter list is open, to the locals total otherwise.
    pub(super) fn add_symbol(&mut self, name: &str, kind: SymbolKind) -> CompileResult<SymbolId> {
        let depth = self.state.depth;
        let owner = self.state.parent;

        if let Some(existing) = self.symbols.lookup_symbol(name) {
            if existing.depth == depth && existing.owner == owner {
                return Err(CompileError::Duplicate {
                    file: self.filename().to_string(),
                    line: self.token.line,
                    name: name.to_string(),
                });
            }
        }

        let is_constant = matches!(kind, SymbolKind::Constant { .. });
        let is_class = matches!(kind, SymbolKind::Class { .. });
        let is_method = matches!(kind, SymbolKind::Method { .. });
        let size = kind.size();

        let offset = if is_constant || depth <= 1 {
            0
        } else {
            self.state.locals.declare(size)
        };

        let id = self.symbols.insert(name, kind, depth);
        self.symbols[id].owner = owner;
        self.symbols[id].offset = offset;
        self.state.current = Some(id);

        if !is_constant {
            if let Some(owner) = owner {
                if self.state.in_params {
                    let location = self
                        .symbols
                        .get_mut(owner)
                        .map(|o| o.add_param(size))
                        .unwrap_or_default();
                    if let SymbolKind::Variable { location: slot, .. } = &mut self.symbols[id].kind {
                        *slot = location;
                    }
                } else if let Some(o) = self.symbols.get_mut(owner) {
                    o.grow_locals(size);
                }
            }
        }

        if is_class {
            self.state.current_class = Some(id);
        }
        if is_method {
            self.state.current_method = Some(id);
        }

        Ok(id)
    }

    /// Fresh int slot strictly below every live offset.
    pub(super) fn new_temp(&mut self) -> Operand {
        let offset = self.symbols.min_offset() - 2;
        let name = Operand::Frame(offset).to_string();
        let id = self
            .symbols
            .insert(&name, SymbolKind::variable(ValueType::Int), self.state.depth);
        self.symbols[id].offset = offset;
        self.symbols[id].owner = self.state.parent;
        if let Some(m) = self.state.current_method.and_then(|m| self.symbols.get_mut(m)) {
            m.grow_locals(2);
        }
        self.state.current = Some(id);
        Operand::Frame(offset)
    }

    /// How TAC refers to `id`: constants by value, class-level names by name,
    /// everything else by frame slot.
    pub(super) fn operand_of(&self, id: SymbolId) -> Operand {
        let symbol = &self.symbols[id];
        if let Some(value) = symbol.constant_value() {
            Operand::literal(value)
        } else if symbol.depth <= 1 {
            Operand::Global(symbol.name.clone())
        } else {
            Operand::Frame(symbol.offset)
        }
    }

    /// Resolves a name used as a value. An unknown name is declared on the
    /// spot as an untyped placeholder so translation can go on.
    pub(super) fn resolve_read(&mut self, name: &str) -> CompileResult<SymbolId> {
        if let Some(id) = self.symbols.lookup(name) {
            return Ok(id);
        }
        let message = format!(
            "{}:{}: undeclared variable {}",
            self.filename(),
            self.token.line,
            name
        );
        warn!("{}", message);
        self.warnings.push(message);
        self.add_symbol(name, SymbolKind::Empty)
    }

    /// Resolves the target of `read`/`write`, which must already exist.
    pub(super) fn resolve_io(&self, name: &str, access: &'static str) -> CompileResult<SymbolId> {
        self.symbols
            .lookup(name)
            .ok_or_else(|| CompileError::UndeclaredTarget {
                file: self.filename().to_string(),
                line: self.token.line,
                access,
                name: name.to_string(),
            })
    }

    pub(super) fn assign_to_constant(&self, name: &str) -> CompileError {
        CompileError::AssignToConstant {
            file: self.filename().to_string(),
            line: self.token.line,
            name: name.to_string(),
        }
    }

    /// `Owner.Name` for a method record.
    pub(super) fn qualified_name(&self, id: SymbolId) -> String {
        match self.symbols.owner_name(id) {
            Some(owner) => format!("{}.{}", owner, self.symbols[id].name),
            None => self.symbols[id].name.clone(),
        }
    }

    /// program = using* (namespace | class*) eof
    fn parse_program(&mut self) -> CompileResult<()> {
        while self.check(TokenKind::Using) {
            self.parse_using()?;
        }

        if self.check(TokenKind::Namespace) {
            self.parse_namespace()?;
        } else {
            self.parse_classes()?;
        }

        self.expect(TokenKind::Eof)?;
        Ok(())
    }

    /// using = "using" qualified_name ";"
    fn parse_using(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Using)?;
        let name = self.parse_qualified_name()?;
        debug!("using {}", name);
        self.expect(TokenKind::SemiColon)?;
        Ok(())
    }

    /// qualified_name = ident ("." ident)*
    pub(super) fn parse_qualified_name(&mut self) -> CompileResult<String> {
        let mut name = self.expect_ident()?;
        while self.consume(TokenKind::Period)? {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    /// namespace = "namespace" qualified_name "{" class* "}"
    fn parse_namespace(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Namespace)?;
        let line = self.token.line;
        let name = self.parse_qualified_name()?;
        let id = self.add_symbol(&name, SymbolKind::Namespace)?;
        debug!("namespace {} at line {}", name, line);

        let outer = self.state.parent;
        self.state.parent = Some(id);
        self.expect(TokenKind::LeftBrace)?;
        self.parse_classes()?;
        self.expect(TokenKind::RightBrace)?;
        self.state.parent = outer;
        Ok(())
    }

    fn parse_classes(&mut self) -> CompileResult<()> {
        while self.token.kind.is_modifier() || self.check(TokenKind::Class) {
            self.parse_class()?;
        }
        Ok(())
    }

    pub(super) fn parse_modifiers(&mut self) -> CompileResult<()> {
        while self.token.kind.is_modifier() {
            self.advance()?;
        }
        Ok(())
    }

    /// class = modifier* "class" ident (":" qualified_name)? "{" member* "}"
    fn parse_class(&mut self) -> CompileResult<()> {
        self.parse_modifiers()?;
        self.open_class()?;

        let name = self.token.lexeme.clone();
        if !self.check(TokenKind::Identifier) {
            return Err(self.mismatch(TokenKind::Identifier.name()));
        }
        let id = self.add_symbol(&name, SymbolKind::class())?;
        self.advance()?;

        if self.consume(TokenKind::Colon)? {
            let base = self.parse_qualified_name()?;
            debug!("{} derives from {}", name, base);
        }

        self.open_class_body(id)?;
        self.parse_members(&name)?;
        self.close_scope()?;
        Ok(())
    }
}
