//! IR emitter — lowers the typed AST to an LLVM module in SSA form.
//!
//! The emitter walks each function once, appending instructions to a
//! [`FunctionBuilder`] while a module-wide [`ModuleBuilder`] collects
//! string constants and debug mirror globals. Every local lives in an
//! `alloca` slot; expression values are immediates or `%tN` temporaries,
//! so the SSA discipline holds without a mem2reg-style pass.
//!
//! Strings are immediate `{ ptr, i32 }` aggregates (data pointer plus
//! byte length). Concatenation allocates `len1 + len2 + 1` bytes with
//! `malloc`, copies both halves and NUL-terminates; the buffer is never
//! freed, which is fine for a run-to-completion program.
//!
//! Every `var` additionally gets a module-level `__dbg_<fn>_<var>`
//! global that receives a copy of each value stored to the local, so
//! final values survive into the object file for external inspection.
//!
//! The analyzer has already established every typing fact this stage
//! relies on; anything missing or contradictory here is reported as an
//! internal diagnostic and aborts emission.

use std::collections::HashMap;

use crate::ast::*;
use crate::errors::{Diagnostic, ErrorCode};
use crate::ir::{format_double, FunctionBuilder, IrType, Labels, ModuleBuilder, Value};
use crate::token::Span;
use crate::types::{fold_string_to_float, fold_string_to_int, Type, TypeTable};

/// Lower a checked program to LLVM IR text.
pub fn emit(program: &Program, table: &TypeTable, file: &str) -> Result<String, Diagnostic> {
    Emitter::new(table, file).emit(program)
}

/// A local variable's stack slot.
#[derive(Debug, Clone)]
struct Slot {
    reg: String,
    ty: IrType,
}

/// Per-function lowering state, created on entry and dropped on return.
struct FnState {
    name: String,
    fb: FunctionBuilder,
    /// Innermost scope last, mirroring the analyzer's scope stack.
    scopes: Vec<HashMap<String, Slot>>,
    /// How many slots have used a given source name; shadowed
    /// redeclarations get a `.N` suffix to keep registers unique.
    reg_names: HashMap<String, u32>,
}

impl FnState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fb: FunctionBuilder::new(name),
            scopes: Vec::new(),
            reg_names: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Slot> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn fresh_slot_reg(&mut self, name: &str) -> String {
        let count = self.reg_names.entry(name.to_string()).or_insert(0);
        let reg = if *count == 0 {
            format!("%{}", name)
        } else {
            format!("%{}.{}", name, count)
        };
        *count += 1;
        reg
    }
}

struct Emitter<'a> {
    table: &'a TypeTable,
    file: String,
    module: ModuleBuilder,
    /// Module-wide label allocator; block labels stay unique per
    /// function as a consequence.
    labels: Labels,
}

impl<'a> Emitter<'a> {
    fn new(table: &'a TypeTable, file: &str) -> Self {
        Self {
            table,
            file: file.to_string(),
            module: ModuleBuilder::new(file),
            labels: Labels::default(),
        }
    }

    fn emit(mut self, program: &Program) -> Result<String, Diagnostic> {
        for decl in program {
            self.emit_fn(decl)?;
        }
        Ok(self.module.finish())
    }

    fn emit_fn(&mut self, decl: &FnDecl) -> Result<(), Diagnostic> {
        let mut f = FnState::new(&decl.name);
        f.fb.open_block("entry");
        f.scopes.push(HashMap::new());
        for stmt in &decl.body.stmts {
            self.emit_stmt(&mut f, stmt)?;
        }
        f.scopes.pop();
        f.fb.inst("ret i32 0");
        self.module.push_function(f.fb.finish());
        Ok(())
    }

    fn emit_block(&mut self, f: &mut FnState, block: &Block) -> Result<(), Diagnostic> {
        f.scopes.push(HashMap::new());
        for stmt in &block.stmts {
            let result = self.emit_stmt(f, stmt);
            if result.is_err() {
                f.scopes.pop();
                return result;
            }
        }
        f.scopes.pop();
        Ok(())
    }

    // ── Statements ───────────────────────────────────────────────────

    fn emit_stmt(&mut self, f: &mut FnState, stmt: &Stmt) -> Result<(), Diagnostic> {
        match &stmt.kind {
            StmtKind::VarDecl {
                name, ty, init, ..
            } => self.emit_var_decl(f, stmt.span, name, ty.as_ref(), init.as_ref()),

            StmtKind::Assign { name, value } => {
                let value = self.emit_expr(f, value)?;
                let slot = f.lookup(name).cloned().ok_or_else(|| {
                    self.internal(stmt.span, format!("no slot for variable '{}'", name))
                })?;
                f.fb
                    .inst(format!("store {}, ptr {}", value.typed(), slot.reg));
                self.mirror_store(f, name, &value);
                Ok(())
            }

            StmtKind::Expression(expr) => {
                self.emit_expr(f, expr)?;
                Ok(())
            }

            StmtKind::If {
                branches,
                else_body,
            } => self.emit_if(f, branches, else_body.as_ref()),

            StmtKind::While { cond, body } => self.emit_while(f, cond, body),
        }
    }

    fn emit_var_decl(
        &mut self,
        f: &mut FnState,
        span: Span,
        name: &str,
        ty: Option<&TypeRef>,
        init: Option<&Expr>,
    ) -> Result<(), Diagnostic> {
        let var_ty = match ty {
            Some(type_ref) => Type::from_name(&type_ref.name)
                .ok_or_else(|| self.internal(span, format!("unresolved type '{}'", type_ref.name)))?,
            None => {
                let init = init
                    .ok_or_else(|| self.internal(span, "variable has neither type nor initializer"))?;
                self.expr_type(init)?
            }
        };
        let ir_ty = IrType::from(var_ty);

        let reg = f.fresh_slot_reg(name);
        f.fb.inst(format!("{} = alloca {}", reg, ir_ty.text()));

        let value = match init {
            Some(expr) => self.emit_expr(f, expr)?,
            None => Value::new(ir_ty, ir_ty.zero()),
        };
        f.fb.inst(format!("store {}, ptr {}", value.typed(), reg));

        f.scopes
            .last_mut()
            .expect("scope stack empty")
            .insert(name.to_string(), Slot { reg, ty: ir_ty });
        self.mirror_store(f, name, &value);
        Ok(())
    }

    /// Copy a just-stored value to the variable's debug mirror global.
    fn mirror_store(&mut self, f: &mut FnState, name: &str, value: &Value) {
        if let Some(mirror) = self.module.debug_mirror(&f.name, name, value.ty) {
            f.fb
                .inst(format!("store {}, ptr {}", value.typed(), mirror));
        }
    }

    /// `if`/`elif`/`else`: one `end` label, one `then` per branch, a
    /// `check` block per condition after the first, and an optional
    /// `else` block. Each condition branches to its body or onward to
    /// the next check, the else block, or the end.
    fn emit_if(
        &mut self,
        f: &mut FnState,
        branches: &[IfBranch],
        else_body: Option<&Block>,
    ) -> Result<(), Diagnostic> {
        let n = branches.len();
        let then_labels: Vec<String> = branches.iter().map(|_| self.labels.next("then")).collect();
        let check_labels: Vec<String> = (1..n).map(|_| self.labels.next("check")).collect();
        let else_label = else_body.map(|_| self.labels.next("else"));
        let end_label = self.labels.next("end");

        for (i, branch) in branches.iter().enumerate() {
            let cond = self.emit_expr(f, &branch.cond)?;
            let false_target = if i + 1 < n {
                &check_labels[i]
            } else {
                else_label.as_ref().unwrap_or(&end_label)
            };
            f.fb.inst(format!(
                "br i1 {}, label %{}, label %{}",
                cond.repr, then_labels[i], false_target
            ));

            f.fb.open_block(&then_labels[i]);
            self.emit_block(f, &branch.body)?;
            f.fb.inst(format!("br label %{}", end_label));

            if i + 1 < n {
                f.fb.open_block(&check_labels[i]);
            }
        }

        if let Some(body) = else_body {
            let label = else_label.as_ref().expect("else label not allocated");
            f.fb.open_block(label);
            self.emit_block(f, body)?;
            f.fb.inst(format!("br label %{}", end_label));
        }

        f.fb.open_block(&end_label);
        Ok(())
    }

    /// `while`: header evaluates the condition, the body branches back
    /// to the header, and `end` continues after the loop.
    fn emit_while(&mut self, f: &mut FnState, cond: &Expr, body: &Block) -> Result<(), Diagnostic> {
        let header = self.labels.next("cond");
        let body_label = self.labels.next("body");
        let end_label = self.labels.next("end");

        f.fb.inst(format!("br label %{}", header));
        f.fb.open_block(&header);
        let cond = self.emit_expr(f, cond)?;
        f.fb.inst(format!(
            "br i1 {}, label %{}, label %{}",
            cond.repr, body_label, end_label
        ));

        f.fb.open_block(&body_label);
        self.emit_block(f, body)?;
        f.fb.inst(format!("br label %{}", header));

        f.fb.open_block(&end_label);
        Ok(())
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn emit_expr(&mut self, f: &mut FnState, expr: &Expr) -> Result<Value, Diagnostic> {
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::new(IrType::I32, (*n as i32).to_string())),
            ExprKind::FloatLit(n) => Ok(Value::new(IrType::F64, format_double(*n))),
            ExprKind::BoolLit(b) => Ok(Value::new(IrType::I1, if *b { "1" } else { "0" })),
            ExprKind::CharLit(c) => Ok(Value::new(IrType::I8, (*c as u32 as u8).to_string())),

            ExprKind::StringLit(payload) => {
                let constant = self.module.strings.intern(payload);
                Ok(Value::new(
                    IrType::Str,
                    format!("{{ ptr {}, i32 {} }}", constant.name, constant.len),
                ))
            }

            ExprKind::Ident(name) => {
                let slot = f.lookup(name).cloned().ok_or_else(|| {
                    self.internal(expr.span, format!("no slot for variable '{}'", name))
                })?;
                let temp = f.fb.fresh_temp();
                f.fb.inst(format!(
                    "{} = load {}, ptr {}",
                    temp,
                    slot.ty.text(),
                    slot.reg
                ));
                Ok(Value::new(slot.ty, temp))
            }

            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    let value = self.emit_expr(f, operand)?;
                    let temp = f.fb.fresh_temp();
                    f.fb.inst(format!("{} = xor i1 {}, true", temp, value.repr));
                    Ok(Value::new(IrType::I1, temp))
                }
            },

            ExprKind::Binary { left, op, right } => match op {
                BinOp::And => self.emit_short_circuit(f, left, right, true),
                BinOp::Or => self.emit_short_circuit(f, left, right, false),
                _ => {
                    let lhs = self.emit_expr(f, left)?;
                    let rhs = self.emit_expr(f, right)?;
                    if op.is_equality() || op.is_ordering() {
                        self.emit_compare(f, expr.span, *op, &lhs, &rhs)
                    } else if lhs.ty == IrType::Str {
                        self.emit_concat(f, &lhs, &rhs)
                    } else if *op == BinOp::Pow {
                        Ok(self.emit_pow(f, &lhs, &rhs))
                    } else {
                        self.emit_arith(f, expr.span, *op, &lhs, &rhs)
                    }
                }
            },

            ExprKind::Call { callee, args } => self.emit_call(f, expr.span, callee, args),

            ExprKind::MethodCall {
                receiver, method, ..
            } => self.emit_method_call(f, expr.span, receiver, method),
        }
    }

    fn emit_arith(
        &mut self,
        f: &mut FnState,
        span: Span,
        op: BinOp,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, Diagnostic> {
        let opcode = match (op, lhs.ty) {
            (BinOp::Add, IrType::I32) => "add",
            (BinOp::Sub, IrType::I32) => "sub",
            (BinOp::Mul, IrType::I32) => "mul",
            (BinOp::Div, IrType::I32) => "sdiv",
            (BinOp::Mod, IrType::I32) => "srem",
            (BinOp::Add, IrType::F64) => "fadd",
            (BinOp::Sub, IrType::F64) => "fsub",
            (BinOp::Mul, IrType::F64) => "fmul",
            (BinOp::Div, IrType::F64) => "fdiv",
            _ => {
                return Err(self.internal(
                    span,
                    format!("'{}' on operands of type {}", op.symbol(), lhs.ty.text()),
                ));
            }
        };
        let temp = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = {} {} {}, {}",
            temp,
            opcode,
            lhs.ty.text(),
            lhs.repr,
            rhs.repr
        ));
        Ok(Value::new(lhs.ty, temp))
    }

    /// `^` goes through the pow intrinsic; integer operands are widened
    /// to double and the result narrowed back.
    fn emit_pow(&mut self, f: &mut FnState, lhs: &Value, rhs: &Value) -> Value {
        let (a, b) = if lhs.ty == IrType::I32 {
            let a = f.fb.fresh_temp();
            f.fb
                .inst(format!("{} = sitofp i32 {} to double", a, lhs.repr));
            let b = f.fb.fresh_temp();
            f.fb
                .inst(format!("{} = sitofp i32 {} to double", b, rhs.repr));
            (a, b)
        } else {
            (lhs.repr.clone(), rhs.repr.clone())
        };

        let pow = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = call double @llvm.pow.f64(double {}, double {})",
            pow, a, b
        ));

        if lhs.ty == IrType::I32 {
            let narrowed = f.fb.fresh_temp();
            f.fb
                .inst(format!("{} = fptosi double {} to i32", narrowed, pow));
            Value::new(IrType::I32, narrowed)
        } else {
            Value::new(IrType::F64, pow)
        }
    }

    fn emit_compare(
        &mut self,
        f: &mut FnState,
        span: Span,
        op: BinOp,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, Diagnostic> {
        let temp = f.fb.fresh_temp();
        match lhs.ty {
            IrType::F64 => {
                let pred = match op {
                    BinOp::Eq => "oeq",
                    BinOp::Ne => "one",
                    BinOp::Lt => "olt",
                    BinOp::Le => "ole",
                    BinOp::Gt => "ogt",
                    BinOp::Ge => "oge",
                    _ => return Err(self.internal(span, "non-comparison in compare lowering")),
                };
                f.fb.inst(format!(
                    "{} = fcmp {} double {}, {}",
                    temp, pred, lhs.repr, rhs.repr
                ));
            }
            IrType::I32 | IrType::I8 | IrType::I1 => {
                let pred = match op {
                    BinOp::Eq => "eq",
                    BinOp::Ne => "ne",
                    BinOp::Lt => "slt",
                    BinOp::Le => "sle",
                    BinOp::Gt => "sgt",
                    BinOp::Ge => "sge",
                    _ => return Err(self.internal(span, "non-comparison in compare lowering")),
                };
                f.fb.inst(format!(
                    "{} = icmp {} {} {}, {}",
                    temp,
                    pred,
                    lhs.ty.text(),
                    lhs.repr,
                    rhs.repr
                ));
            }
            IrType::Str => {
                // String equality compares the data pointers, not the
                // bytes. Two equal literals compare equal because the
                // constant pool interns them; a concatenated string is
                // never equal to any literal.
                let pred = match op {
                    BinOp::Eq => "eq",
                    BinOp::Ne => "ne",
                    _ => return Err(self.internal(span, "ordering comparison on strings")),
                };
                let left_ptr = self.extract_field(f, lhs, 0);
                let right_ptr = self.extract_field(f, rhs, 0);
                f.fb.inst(format!(
                    "{} = icmp {} ptr {}, {}",
                    temp, pred, left_ptr, right_ptr
                ));
            }
        }
        Ok(Value::new(IrType::I1, temp))
    }

    /// String concatenation: `malloc(len1 + len2 + 1)`, copy both
    /// halves, NUL-terminate, repack as `{ ptr, i32 }`. The buffer is
    /// intentionally never freed.
    fn emit_concat(
        &mut self,
        f: &mut FnState,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, Diagnostic> {
        let left_ptr = self.extract_field(f, lhs, 0);
        let left_len = self.extract_field(f, lhs, 1);
        let right_ptr = self.extract_field(f, rhs, 0);
        let right_len = self.extract_field(f, rhs, 1);

        let total = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = add i32 {}, {}",
            total, left_len, right_len
        ));
        let total64 = f.fb.fresh_temp();
        f.fb
            .inst(format!("{} = zext i32 {} to i64", total64, total));
        let size = f.fb.fresh_temp();
        f.fb.inst(format!("{} = add i64 {}, 1", size, total64));
        let buf = f.fb.fresh_temp();
        f.fb
            .inst(format!("{} = call ptr @malloc(i64 {})", buf, size));

        let left_len64 = f.fb.fresh_temp();
        f.fb
            .inst(format!("{} = zext i32 {} to i64", left_len64, left_len));
        let copied = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = call ptr @memcpy(ptr {}, ptr {}, i64 {})",
            copied, buf, left_ptr, left_len64
        ));

        let tail = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = getelementptr i8, ptr {}, i64 {}",
            tail, buf, left_len64
        ));
        let right_len64 = f.fb.fresh_temp();
        f.fb
            .inst(format!("{} = zext i32 {} to i64", right_len64, right_len));
        let copied2 = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = call ptr @memcpy(ptr {}, ptr {}, i64 {})",
            copied2, tail, right_ptr, right_len64
        ));

        let nul = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = getelementptr i8, ptr {}, i64 {}",
            nul, buf, total64
        ));
        f.fb.inst(format!("store i8 0, ptr {}", nul));

        Ok(self.pack_string(f, &buf, &total))
    }

    /// Short-circuit `&&`/`||`. The right-hand side is evaluated in its
    /// own block; the constant path produces 0 (for `&&`) or 1 (for
    /// `||`) and a `phi i1` joins the two at the end block.
    fn emit_short_circuit(
        &mut self,
        f: &mut FnState,
        left: &Expr,
        right: &Expr,
        is_and: bool,
    ) -> Result<Value, Diagnostic> {
        let lhs = self.emit_expr(f, left)?;

        let (rhs_label, const_label, end_label, const_repr) = if is_and {
            (
                self.labels.next("and_rhs"),
                self.labels.next("and_false"),
                self.labels.next("and_end"),
                "0",
            )
        } else {
            (
                self.labels.next("or_rhs"),
                self.labels.next("or_true"),
                self.labels.next("or_end"),
                "1",
            )
        };

        if is_and {
            f.fb.inst(format!(
                "br i1 {}, label %{}, label %{}",
                lhs.repr, rhs_label, const_label
            ));
        } else {
            f.fb.inst(format!(
                "br i1 {}, label %{}, label %{}",
                lhs.repr, const_label, rhs_label
            ));
        }

        f.fb.open_block(&rhs_label);
        let rhs = self.emit_expr(f, right)?;
        // Nested short-circuits may have moved us to another block; the
        // phi needs the actual predecessor.
        let rhs_pred = f.fb.current_block().to_string();
        f.fb.inst(format!("br label %{}", end_label));

        f.fb.open_block(&const_label);
        f.fb.inst(format!("br label %{}", end_label));

        f.fb.open_block(&end_label);
        let temp = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = phi i1 [ {}, %{} ], [ {}, %{} ]",
            temp, const_repr, const_label, rhs.repr, rhs_pred
        ));
        Ok(Value::new(IrType::I1, temp))
    }

    /// `print`/`println` lower to a variadic printf call; the format
    /// string is picked from the argument's IR type.
    fn emit_call(
        &mut self,
        f: &mut FnState,
        span: Span,
        callee: &str,
        args: &[Expr],
    ) -> Result<Value, Diagnostic> {
        if callee != "print" && callee != "println" {
            return Err(self.internal(span, format!("call to unknown function '{}'", callee)));
        }
        let arg = args
            .first()
            .ok_or_else(|| self.internal(span, "print call without an argument"))?;
        let value = self.emit_expr(f, arg)?;

        let (fmt, operand) = match value.ty {
            IrType::I32 => ("%d", value.typed()),
            IrType::I1 | IrType::I8 => {
                let widened = self.widen_to_i32(f, &value);
                ("%d", format!("i32 {}", widened))
            }
            IrType::F64 => ("%f", value.typed()),
            IrType::Str => {
                let ptr = self.extract_field(f, &value, 0);
                ("%s", format!("ptr {}", ptr))
            }
        };

        let fmt = if callee == "println" {
            format!("{}\n", fmt)
        } else {
            fmt.to_string()
        };
        let constant = self.module.strings.intern(&fmt);

        let temp = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = call i32 (ptr, ...) @printf(ptr {}, {})",
            temp, constant.name, operand
        ));
        Ok(Value::new(IrType::I32, temp))
    }

    fn emit_method_call(
        &mut self,
        f: &mut FnState,
        span: Span,
        receiver: &Expr,
        method: &str,
    ) -> Result<Value, Diagnostic> {
        // Compile-time folds never evaluate the receiver.
        if let ExprKind::StringLit(payload) = &receiver.kind {
            match method {
                "toInt" => {
                    let folded = fold_string_to_int(payload).ok_or_else(|| {
                        self.internal(span, "unfoldable string literal reached emission")
                    })?;
                    return Ok(Value::new(IrType::I32, folded.to_string()));
                }
                "toFloat" => {
                    let folded = fold_string_to_float(payload).ok_or_else(|| {
                        self.internal(span, "unfoldable string literal reached emission")
                    })?;
                    return Ok(Value::new(IrType::F64, format_double(folded)));
                }
                _ => {}
            }
        }

        let value = self.emit_expr(f, receiver)?;
        match (method, value.ty) {
            ("toString", IrType::Str) => Ok(value),
            ("toString", _) => Ok(self.emit_to_string(f, &value)),

            ("toInt", IrType::I32) => Ok(value),
            ("toInt", IrType::F64) => {
                let temp = f.fb.fresh_temp();
                f.fb.inst(format!(
                    "{} = fptosi double {} to i32",
                    temp, value.repr
                ));
                Ok(Value::new(IrType::I32, temp))
            }
            ("toInt", IrType::I1 | IrType::I8) => {
                let widened = self.widen_to_i32(f, &value);
                Ok(Value::new(IrType::I32, widened))
            }
            ("toInt", IrType::Str) => {
                let ptr = self.extract_field(f, &value, 0);
                let long = f.fb.fresh_temp();
                f.fb.inst(format!(
                    "{} = call i64 @strtol(ptr {}, ptr null, i32 10)",
                    long, ptr
                ));
                let temp = f.fb.fresh_temp();
                f.fb
                    .inst(format!("{} = trunc i64 {} to i32", temp, long));
                Ok(Value::new(IrType::I32, temp))
            }

            ("toFloat", IrType::F64) => Ok(value),
            ("toFloat", IrType::I32) => {
                let temp = f.fb.fresh_temp();
                f.fb.inst(format!(
                    "{} = sitofp i32 {} to double",
                    temp, value.repr
                ));
                Ok(Value::new(IrType::F64, temp))
            }
            ("toFloat", IrType::I1 | IrType::I8) => {
                let widened = self.widen_to_i32(f, &value);
                let temp = f.fb.fresh_temp();
                f.fb
                    .inst(format!("{} = sitofp i32 {} to double", temp, widened));
                Ok(Value::new(IrType::F64, temp))
            }
            ("toFloat", IrType::Str) => {
                let ptr = self.extract_field(f, &value, 0);
                let temp = f.fb.fresh_temp();
                f.fb.inst(format!(
                    "{} = call double @strtod(ptr {}, ptr null)",
                    temp, ptr
                ));
                Ok(Value::new(IrType::F64, temp))
            }

            _ => Err(self.internal(span, format!("unknown method '{}'", method))),
        }
    }

    /// `toString` on a number, char or bool: snprintf into a 64-byte
    /// stack buffer, packing the buffer and the formatted length.
    fn emit_to_string(&mut self, f: &mut FnState, value: &Value) -> Value {
        let (fmt, operand) = match value.ty {
            IrType::F64 => ("%f", value.typed()),
            IrType::I32 => ("%d", value.typed()),
            _ => {
                let widened = self.widen_to_i32(f, value);
                ("%d", format!("i32 {}", widened))
            }
        };
        let constant = self.module.strings.intern(fmt);

        let buf = f.fb.fresh_temp();
        f.fb.inst(format!("{} = alloca [64 x i8]", buf));
        let len = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = call i32 (ptr, i64, ptr, ...) @snprintf(ptr {}, i64 64, ptr {}, {})",
            len, buf, constant.name, operand
        ));
        self.pack_string(f, &buf, &len)
    }

    // ── Small helpers ────────────────────────────────────────────────

    fn widen_to_i32(&mut self, f: &mut FnState, value: &Value) -> String {
        let temp = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = zext {} {} to i32",
            temp,
            value.ty.text(),
            value.repr
        ));
        temp
    }

    fn extract_field(&mut self, f: &mut FnState, value: &Value, index: u32) -> String {
        let temp = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = extractvalue {{ ptr, i32 }} {}, {}",
            temp, value.repr, index
        ));
        temp
    }

    /// Build a `{ ptr, i32 }` aggregate from a pointer and a length.
    fn pack_string(&mut self, f: &mut FnState, ptr: &str, len: &str) -> Value {
        let partial = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = insertvalue {{ ptr, i32 }} undef, ptr {}, 0",
            partial, ptr
        ));
        let full = f.fb.fresh_temp();
        f.fb.inst(format!(
            "{} = insertvalue {{ ptr, i32 }} {}, i32 {}, 1",
            full, partial, len
        ));
        Value::new(IrType::Str, full)
    }

    fn expr_type(&self, expr: &Expr) -> Result<Type, Diagnostic> {
        self.table
            .expr(expr.id)
            .ok_or_else(|| self.internal(expr.span, "expression missing from the type table"))
    }

    fn internal(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(ErrorCode::Internal, &self.file, span, vec![message.into()])
    }
}
