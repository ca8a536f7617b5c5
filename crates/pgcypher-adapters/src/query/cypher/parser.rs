//! Cypher Parser.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use pgcypher_common::Value;
use pgcypher_common::utils::error::{Error, QueryError, QueryErrorKind, Result, SourceSpan};
use smallvec::SmallVec;

/// Deepest nesting of parentheses, lists, calls and negations accepted.
const MAX_NESTING_DEPTH: usize = 64;

/// Cypher Parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    source: &'a str,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source: input,
            depth: 0,
        }
    }

    /// Parses the input into a query.
    ///
    /// # Errors
    ///
    /// Returns a syntax error on the first token that does not fit the
    /// grammar, or a lexer error on unreadable input.
    pub fn parse(&mut self) -> Result<Query> {
        let start = self.current.span;

        if self.current.kind != TokenKind::Match {
            return Err(self.error("Expected MATCH"));
        }

        let mut match_clauses = Vec::new();
        while self.current.kind == TokenKind::Match {
            match_clauses.push(self.parse_match_clause()?);
        }

        if self.current.kind != TokenKind::Return {
            return Err(self.error("Expected RETURN"));
        }
        let return_clause = self.parse_return_clause()?;

        if self.current.kind != TokenKind::Eof {
            return Err(self.error("Expected end of query"));
        }

        Ok(Query {
            match_clauses,
            return_clause,
            span: Some(self.span_from(start)),
        })
    }

    fn parse_match_clause(&mut self) -> Result<MatchClause> {
        let start = self.current.span;
        self.expect(TokenKind::Match)?;

        let mut patterns = vec![self.parse_pattern_part()?];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            patterns.push(self.parse_pattern_part()?);
        }

        let where_clause = if self.current.kind == TokenKind::Where {
            self.advance();
            Some(WhereClause {
                expressions: vec![self.parse_expression()?],
            })
        } else {
            None
        };

        Ok(MatchClause {
            patterns,
            where_clause,
            span: Some(self.span_from(start)),
        })
    }

    fn parse_pattern_part(&mut self) -> Result<PatternPart> {
        // `p = (a)-->(b)`
        let binding = if self.current.kind == TokenKind::Identifier {
            let name = self.current.text.clone();
            self.advance();
            self.expect(TokenKind::Eq)?;
            Some(name)
        } else {
            None
        };

        let mut elements = vec![PatternElement::Node(self.parse_node_pattern()?)];
        while matches!(self.current.kind, TokenKind::Minus | TokenKind::LeftArrow) {
            elements.push(PatternElement::Relationship(
                self.parse_relationship_pattern()?,
            ));
            elements.push(PatternElement::Node(self.parse_node_pattern()?));
        }

        Ok(PatternPart { binding, elements })
    }

    fn parse_node_pattern(&mut self) -> Result<NodePattern> {
        self.expect(TokenKind::LParen)?;

        let binding = self.parse_optional_identifier();

        let mut labels = Vec::new();
        while self.current.kind == TokenKind::Colon {
            self.advance();
            labels.push(self.parse_identifier("Expected label name")?);
        }

        self.expect(TokenKind::RParen)?;

        Ok(NodePattern { binding, labels })
    }

    fn parse_relationship_pattern(&mut self) -> Result<RelationshipPattern> {
        // Leading `<-` or `-`, optional detail, trailing `->` or `-`.
        let inbound = self.current.kind == TokenKind::LeftArrow;
        self.advance();

        let (binding, types, range) = if self.current.kind == TokenKind::LBracket {
            self.advance();
            let detail = self.parse_relationship_detail()?;
            self.expect(TokenKind::RBracket)?;
            detail
        } else {
            (None, Vec::new(), None)
        };

        let direction = match (inbound, self.current.kind) {
            (false, TokenKind::Arrow) => Direction::Outbound,
            (false, TokenKind::Minus) => Direction::Both,
            (true, TokenKind::Minus) => Direction::Inbound,
            (true, TokenKind::Arrow) => {
                return Err(self.error("Relationship cannot point both ways"));
            }
            _ => return Err(self.error("Expected -> or - after relationship pattern")),
        };
        self.advance();

        Ok(RelationshipPattern {
            binding,
            types,
            direction,
            range,
        })
    }

    fn parse_relationship_detail(
        &mut self,
    ) -> Result<(Option<String>, Vec<String>, Option<PatternRange>)> {
        let binding = self.parse_optional_identifier();

        let mut types = Vec::new();
        if self.current.kind == TokenKind::Colon {
            self.advance();
            types.push(self.parse_identifier("Expected relationship type")?);
            while self.current.kind == TokenKind::Pipe {
                self.advance();
                if self.current.kind == TokenKind::Colon {
                    self.advance();
                }
                types.push(self.parse_identifier("Expected relationship type")?);
            }
        }

        let range = if self.current.kind == TokenKind::Star {
            self.advance();
            Some(self.parse_range()?)
        } else {
            None
        };

        Ok((binding, types, range))
    }

    fn parse_range(&mut self) -> Result<PatternRange> {
        let start = self.parse_optional_hops()?;
        if self.current.kind == TokenKind::DotDot {
            self.advance();
            let end = self.parse_optional_hops()?;
            Ok(PatternRange { start, end })
        } else {
            // `*2` is exactly two hops.
            Ok(PatternRange { start, end: start })
        }
    }

    fn parse_optional_hops(&mut self) -> Result<Option<u64>> {
        if self.current.kind != TokenKind::Integer {
            return Ok(None);
        }
        let hops = self
            .current
            .text
            .parse()
            .map_err(|_| self.error("Invalid hop count"))?;
        self.advance();
        Ok(Some(hops))
    }

    fn parse_return_clause(&mut self) -> Result<ReturnClause> {
        let start = self.current.span;
        self.expect(TokenKind::Return)?;

        let distinct = if self.current.kind == TokenKind::Distinct {
            self.advance();
            true
        } else {
            false
        };

        let mut items = vec![self.parse_return_item()?];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            items.push(self.parse_return_item()?);
        }

        Ok(ReturnClause {
            distinct,
            items,
            span: Some(self.span_from(start)),
        })
    }

    fn parse_return_item(&mut self) -> Result<ReturnItem> {
        let expression = self.parse_expression()?;

        let alias = if self.current.kind == TokenKind::As {
            self.advance();
            Some(self.parse_identifier("Expected alias")?)
        } else {
            None
        };

        Ok(ReturnItem { expression, alias })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.nested(Self::parse_or_expression)
    }

    /// Runs `parse` one nesting level deeper, failing past the depth limit.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Expression nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or_expression(&mut self) -> Result<Expression> {
        let first = self.parse_and_expression()?;
        if self.current.kind != TokenKind::Or {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.current.kind == TokenKind::Or {
            self.advance();
            operands.push(self.parse_and_expression()?);
        }
        Ok(Expression::Disjunction(operands))
    }

    fn parse_and_expression(&mut self) -> Result<Expression> {
        let first = self.parse_not_expression()?;
        if self.current.kind != TokenKind::And {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.current.kind == TokenKind::And {
            self.advance();
            operands.push(self.parse_not_expression()?);
        }
        Ok(Expression::Conjunction(operands))
    }

    fn parse_not_expression(&mut self) -> Result<Expression> {
        if self.current.kind == TokenKind::Not {
            self.advance();
            let operand = self.nested(Self::parse_not_expression)?;
            return Ok(Expression::Negation(Box::new(operand)));
        }
        self.parse_comparison_expression()
    }

    fn parse_comparison_expression(&mut self) -> Result<Expression> {
        let left = self.parse_additive_expression()?;

        let mut partials = Vec::new();
        while let Some(operator) = comparison_operator(self.current.kind) {
            self.advance();
            let right = self.parse_additive_expression()?;
            partials.push(Partial { operator, right });
        }

        Ok(chain(left, partials, Expression::Comparison))
    }

    fn parse_additive_expression(&mut self) -> Result<Expression> {
        let left = self.parse_multiplicative_expression()?;

        let mut partials = Vec::new();
        loop {
            let operator = match self.current.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            partials.push(Partial { operator, right });
        }

        Ok(chain(left, partials, Expression::Arithmetic))
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expression> {
        let left = self.parse_power_expression()?;

        let mut partials = Vec::new();
        loop {
            let operator = match self.current.kind {
                TokenKind::Star => Operator::Multiply,
                TokenKind::Slash => Operator::Divide,
                TokenKind::Percent => Operator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_power_expression()?;
            partials.push(Partial { operator, right });
        }

        Ok(chain(left, partials, Expression::Arithmetic))
    }

    fn parse_power_expression(&mut self) -> Result<Expression> {
        let left = self.parse_postfix_expression()?;

        let mut partials = Vec::new();
        while self.current.kind == TokenKind::Caret {
            self.advance();
            let right = self.parse_postfix_expression()?;
            partials.push(Partial {
                operator: Operator::Power,
                right,
            });
        }

        Ok(chain(left, partials, Expression::Arithmetic))
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression> {
        let atom = self.parse_primary_expression()?;
        if self.current.kind != TokenKind::Dot {
            return Ok(atom);
        }

        let mut symbols = SmallVec::new();
        while self.current.kind == TokenKind::Dot {
            self.advance();
            symbols.push(self.parse_identifier("Expected property name")?);
        }

        Ok(Expression::PropertyLookup(PropertyLookup {
            atom: Box::new(atom),
            symbols,
        }))
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        match self.current.kind {
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::null()))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Literal(Literal::new(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Literal(Literal::new(false)))
            }
            TokenKind::Integer | TokenKind::Float => self.parse_number(false),
            TokenKind::Minus => {
                self.advance();
                if matches!(self.current.kind, TokenKind::Integer | TokenKind::Float) {
                    self.parse_number(true)
                } else {
                    Err(self.error("Expected number after unary minus"))
                }
            }
            TokenKind::String => {
                let value = self.current.text.clone();
                self.advance();
                Ok(Expression::Literal(Literal::new(Value::String(value))))
            }
            TokenKind::Parameter => {
                let name = self.current.text.trim_start_matches('$').to_string();
                self.advance();
                Ok(Expression::Parameter(name))
            }
            TokenKind::Identifier => {
                let name = self.current.text.clone();
                self.advance();

                if self.current.kind == TokenKind::LParen {
                    self.parse_function_invocation(name)
                } else {
                    Ok(Expression::Variable(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expression::Parenthetical(Box::new(inner)))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if self.current.kind != TokenKind::RBracket {
                    elements.push(self.parse_expression()?);
                    while self.current.kind == TokenKind::Comma {
                        self.advance();
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expression::List(elements))
            }
            _ => Err(self.error("Expected expression")),
        }
    }

    fn parse_function_invocation(&mut self, name: String) -> Result<Expression> {
        self.expect(TokenKind::LParen)?;

        let distinct = if self.current.kind == TokenKind::Distinct {
            self.advance();
            true
        } else {
            false
        };

        let mut arguments = Vec::new();
        if self.current.kind != TokenKind::RParen {
            arguments.push(self.parse_expression()?);
            while self.current.kind == TokenKind::Comma {
                self.advance();
                arguments.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Expression::FunctionInvocation {
            name,
            distinct,
            arguments,
        })
    }

    fn parse_number(&mut self, negative: bool) -> Result<Expression> {
        let text = if negative {
            format!("-{}", self.current.text)
        } else {
            self.current.text.clone()
        };

        let value = if self.current.kind == TokenKind::Integer {
            text.parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| self.error("Invalid integer"))?
        } else {
            text.parse::<f64>()
                .map(Value::Float64)
                .map_err(|_| self.error("Invalid float"))?
        };
        self.advance();

        Ok(Expression::Literal(Literal::new(value)))
    }

    fn parse_optional_identifier(&mut self) -> Option<String> {
        if self.current.kind == TokenKind::Identifier {
            let name = self.current.text.clone();
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    fn parse_identifier(&mut self, message: &str) -> Result<String> {
        self.parse_optional_identifier()
            .ok_or_else(|| self.error(message))
    }

    fn span_from(&self, start: SourceSpan) -> SourceSpan {
        SourceSpan::new(start.start, self.current.span.start, start.line, start.column)
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {kind:?}")))
        }
    }

    fn error(&self, message: &str) -> Error {
        let (kind, message) = if self.current.kind == TokenKind::Error {
            (QueryErrorKind::Lexer, "Unreadable input")
        } else {
            (QueryErrorKind::Syntax, message)
        };
        Error::Query(
            QueryError::new(kind, message)
                .with_span(self.current.span)
                .with_source(self.source.to_string()),
        )
    }
}

fn comparison_operator(kind: TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Eq => Some(Operator::Equals),
        TokenKind::Ne => Some(Operator::NotEquals),
        TokenKind::Lt => Some(Operator::LessThan),
        TokenKind::Le => Some(Operator::LessThanOrEqualTo),
        TokenKind::Gt => Some(Operator::GreaterThan),
        TokenKind::Ge => Some(Operator::GreaterThanOrEqualTo),
        _ => None,
    }
}

/// Wraps `left` in a chain if any partials followed it.
fn chain(left: Expression, partials: Vec<Partial>, wrap: fn(Chain) -> Expression) -> Expression {
    if partials.is_empty() {
        left
    } else {
        wrap(Chain {
            left: Box::new(left),
            partials,
        })
    }
}
