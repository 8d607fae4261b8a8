use crate::diagnostics::{codes, Diagnostic};
use crate::parser::ast::{Expr, ExprKind, NodeId, Program, Stmt, StmtKind};
use crate::span::Span;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    vars: HashMap<String, Span>,
}

/// Arena of lexical scopes. Scopes reference their parent by id, so the
/// tree is cheap to build and side tables can point into it.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            parent,
            vars: HashMap::new(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Walk the chain from `from` to the root looking for `name`.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<(ScopeId, Span)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(span) = scope.vars.get(name) {
                return Some((id, *span));
            }
            current = scope.parent;
        }
        None
    }

    fn insert(&mut self, scope: ScopeId, name: String, span: Span) {
        self.scopes[scope.0].vars.insert(name, span);
    }

    fn visible_names(&self, from: ScopeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            names.extend(scope.vars.keys().cloned());
            current = scope.parent;
        }
        names
    }
}

/// Everything the analyzer learned: the scope tree, which scope belongs to
/// which function or loop body, and the accumulated diagnostics.
#[derive(Debug)]
pub struct AnalysisResult {
    pub scopes: ScopeTree,
    pub global: ScopeId,
    pub fn_scopes: HashMap<NodeId, ScopeId>,
    pub loop_scopes: HashMap<NodeId, ScopeId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub struct Analyzer {
    reserved: HashSet<String>,
    depth_limit: Option<usize>,
}

impl Analyzer {
    pub fn new(reserved: HashSet<String>) -> Self {
        Analyzer {
            reserved,
            depth_limit: None,
        }
    }

    /// Cap traversal depth; pathologically nested input then degrades into
    /// an `E013` diagnostic instead of exhausting the stack.
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = Some(limit);
        self
    }

    pub fn analyze(&self, program: &Program) -> AnalysisResult {
        let mut scopes = ScopeTree::default();
        let global = scopes.push_scope(None);

        let mut walk = Walk {
            reserved: &self.reserved,
            depth_limit: self.depth_limit,
            registry: HashMap::new(),
            scopes,
            global,
            fn_scopes: HashMap::new(),
            loop_scopes: HashMap::new(),
            diagnostics: Vec::new(),
            loop_depth: 0,
            in_function: false,
            depth: 0,
        };

        // Pass 1: register functions up front so forward references resolve.
        for stmt in &program.statements {
            if let StmtKind::Fn { name, params, .. } = &stmt.kind {
                walk.declare_function(name, params.len(), stmt.span);
            }
        }

        // Pass 2: full traversal with scope and flag tracking.
        for stmt in &program.statements {
            walk.stmt(stmt, global);
        }

        AnalysisResult {
            scopes: walk.scopes,
            global,
            fn_scopes: walk.fn_scopes,
            loop_scopes: walk.loop_scopes,
            diagnostics: walk.diagnostics,
        }
    }
}

struct Walk<'a> {
    reserved: &'a HashSet<String>,
    depth_limit: Option<usize>,
    registry: HashMap<String, usize>,
    scopes: ScopeTree,
    global: ScopeId,
    fn_scopes: HashMap<NodeId, ScopeId>,
    loop_scopes: HashMap<NodeId, ScopeId>,
    diagnostics: Vec<Diagnostic>,
    loop_depth: usize,
    in_function: bool,
    depth: usize,
}

impl Walk<'_> {
    fn declare_function(&mut self, name: &str, arity: usize, span: Span) {
        if self.reserved.contains(name) {
            self.diagnostics.push(Diagnostic::error(
                span,
                codes::INVALID_TYPE,
                format!("reserved name '{}' cannot be used as a function name", name),
            ));
        }
        if self.registry.contains_key(name) {
            self.diagnostics.push(Diagnostic::error(
                span,
                codes::REDECLARED,
                format!("duplicate function '{}'", name),
            ));
            return;
        }
        self.registry.insert(name.to_string(), arity);
        self.scopes.insert(self.global, name.to_string(), span);
    }

    /// Define a name in `scope`, rejecting reserved words and any name
    /// already visible anywhere up the chain (shadowing is disallowed).
    fn define(&mut self, scope: ScopeId, name: &str, span: Span) {
        if self.reserved.contains(name) {
            self.diagnostics.push(Diagnostic::error(
                span,
                codes::INVALID_TYPE,
                format!("reserved name '{}' cannot be used as an identifier", name),
            ));
            return;
        }
        if let Some((found_in, original)) = self.scopes.lookup(scope, name) {
            let message = if found_in == scope {
                format!("name '{}' already defined in this scope", name)
            } else {
                format!(
                    "name '{}' already defined in an enclosing scope (original at {})",
                    name, original
                )
            };
            self.diagnostics
                .push(Diagnostic::error(span, codes::REDECLARED, message));
            return;
        }
        self.scopes.insert(scope, name.to_string(), span);
    }

    fn undefined(&mut self, what: &str, name: &str, span: Span, scope: ScopeId) {
        let mut message = format!("undefined {} '{}'", what, name);
        if let Some(suggestion) = self.find_closest(name, scope) {
            message.push_str(&format!(" (did you mean '{}'?)", suggestion));
        }
        self.diagnostics
            .push(Diagnostic::error(span, codes::UNDECLARED_VAR, message));
    }

    fn find_closest(&self, name: &str, scope: ScopeId) -> Option<String> {
        let mut candidates = self.scopes.visible_names(scope);
        candidates.extend(self.registry.keys().cloned());
        candidates.sort();
        candidates.dedup();

        candidates
            .into_iter()
            .map(|c| (strsim::levenshtein(name, &c), c))
            .filter(|(dist, _)| *dist > 0 && *dist <= 2)
            .min()
            .map(|(_, c)| c)
    }

    fn too_deep(&mut self, span: Span) -> bool {
        match self.depth_limit {
            Some(limit) if self.depth > limit => {
                self.diagnostics.push(Diagnostic::error(
                    span,
                    codes::DEPTH_EXCEEDED,
                    "maximum nesting depth exceeded",
                ));
                true
            }
            _ => false,
        }
    }

    fn stmt(&mut self, stmt: &Stmt, scope: ScopeId) {
        self.depth += 1;
        if self.too_deep(stmt.span) {
            self.depth -= 1;
            return;
        }

        match &stmt.kind {
            StmtKind::Set { name, value } => {
                self.define(scope, name, stmt.span);
                self.expr(value, scope);
            }
            StmtKind::Assign { name, value } => {
                if self.scopes.lookup(scope, name).is_none() {
                    self.undefined("variable", name, stmt.span, scope);
                }
                self.expr(value, scope);
            }
            StmtKind::Call { name, args } => {
                match self.registry.get(name).copied() {
                    None => self.undefined("function", name, stmt.span, scope),
                    Some(expected) if expected != args.len() => {
                        let code = if args.len() < expected {
                            codes::TOO_FEW_ARGS
                        } else {
                            codes::TOO_MANY_ARGS
                        };
                        self.diagnostics.push(Diagnostic::error(
                            stmt.span,
                            code,
                            format!(
                                "{} expects {} arguments, got {}",
                                name,
                                expected,
                                args.len()
                            ),
                        ));
                    }
                    Some(_) => {}
                }
                for arg in args {
                    self.expr(arg, scope);
                }
            }
            StmtKind::Echo { value } => {
                if let Some(value) = value {
                    self.expr(value, scope);
                }
            }
            StmtKind::Run { command } => self.expr(command, scope),
            StmtKind::Fn { params, body, .. } => {
                // Functions do not close over enclosing blocks: their scope
                // hangs off the module scope.
                let fn_scope = self.scopes.push_scope(Some(self.global));
                for param in params {
                    self.define(fn_scope, param, stmt.span);
                }
                self.fn_scopes.insert(stmt.id, fn_scope);

                let was_in_function = self.in_function;
                let outer_loop_depth = self.loop_depth;
                self.in_function = true;
                self.loop_depth = 0;
                for inner in body {
                    self.stmt(inner, fn_scope);
                }
                self.in_function = was_in_function;
                self.loop_depth = outer_loop_depth;
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond, scope);
                let then_scope = self.scopes.push_scope(Some(scope));
                for inner in then_branch {
                    self.stmt(inner, then_scope);
                }
                if !else_branch.is_empty() {
                    let else_scope = self.scopes.push_scope(Some(scope));
                    for inner in else_branch {
                        self.stmt(inner, else_scope);
                    }
                }
            }
            StmtKind::For {
                var,
                start,
                end,
                body,
            } => {
                self.expr(start, scope);
                self.expr(end, scope);
                let loop_scope = self.scopes.push_scope(Some(scope));
                self.define(loop_scope, var, stmt.span);
                self.loop_scopes.insert(stmt.id, loop_scope);
                self.loop_depth += 1;
                for inner in body {
                    self.stmt(inner, loop_scope);
                }
                self.loop_depth -= 1;
            }
            StmtKind::While { cond, body } => {
                self.expr(cond, scope);
                let body_scope = self.scopes.push_scope(Some(scope));
                self.loop_scopes.insert(stmt.id, body_scope);
                self.loop_depth += 1;
                for inner in body {
                    self.stmt(inner, body_scope);
                }
                self.loop_depth -= 1;
            }
            StmtKind::Return(value) => {
                if !self.in_function {
                    self.diagnostics.push(Diagnostic::error(
                        stmt.span,
                        codes::RETURN_OUTSIDE,
                        "return statement outside function",
                    ));
                }
                if let Some(value) = value {
                    self.expr(value, scope);
                }
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.diagnostics.push(Diagnostic::error(
                        stmt.span,
                        codes::BREAK_OUTSIDE,
                        "break statement outside loop",
                    ));
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.diagnostics.push(Diagnostic::error(
                        stmt.span,
                        codes::CONTINUE_OUTSIDE,
                        "continue statement outside loop",
                    ));
                }
            }
        }

        self.depth -= 1;
    }

    fn expr(&mut self, expr: &Expr, scope: ScopeId) {
        self.depth += 1;
        if self.too_deep(expr.span) {
            self.depth -= 1;
            return;
        }

        match &expr.kind {
            ExprKind::Identifier(name) => {
                // Reserved words in expression position read as literals
                // (a customized keyword table can leave e.g. `true` free).
                if !self.reserved.contains(name) && self.scopes.lookup(scope, name).is_none() {
                    self.undefined("variable", name, expr.span, scope);
                }
            }
            ExprKind::Index { left, index } => {
                self.expr(left, scope);
                self.expr(index, scope);
            }
            ExprKind::Property { object, .. } => self.expr(object, scope),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left, scope);
                self.expr(right, scope);
            }
            ExprKind::Unary { operand, .. } => self.expr(operand, scope),
            ExprKind::List(elements) => {
                for element in elements {
                    self.expr(element, scope);
                }
            }
            ExprKind::Map(pairs) => {
                // Keys are literal identifiers, never resolved.
                for pair in pairs {
                    self.expr(&pair.value, scope);
                }
            }
            ExprKind::Exists(path) => self.expr(path, scope),
            ExprKind::Str(_) | ExprKind::Number(_) | ExprKind::Bool(_) => {}
        }

        self.depth -= 1;
    }
}
