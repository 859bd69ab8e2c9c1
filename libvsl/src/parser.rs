use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map, map_res, value};
use nom::multi::many0;
use nom::sequence::{preceded, terminated};
use nom::IResult;
use std::str::FromStr;
use super::ast::*;
use super::helpers;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Func,
    Begin,
    End,
    Var,
    Return,
    Print,
    Continue,
    If,
    Then,
    Else,
    While,
    Do,
    Assign,
    OpenParen,
    CloseParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Pipe,
    Caret,
    Ampersand,
    Tilde,
    Equal,
    Less,
    Greater,
    StringLiteral(String),
    Number(i64),
    Identifier(String),
}

pub fn lex(input: &str) -> IResult<&str, Vec<Token>> {
    all_consuming(terminated(
        many0(preceded(helpers::space, token)),
        helpers::space,
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        punctuation,
        map(helpers::string_body, |text: &str| Token::StringLiteral(text.to_string())),
        map_res(digit1, |digits: &str| i64::from_str(digits).map(Token::Number)),
        map(helpers::identifier, word),
    ))(input)
}

fn punctuation(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Assign, tag(":=")),
        value(Token::OpenParen, tag("(")),
        value(Token::CloseParen, tag(")")),
        value(Token::Comma, tag(",")),
        value(Token::Plus, tag("+")),
        value(Token::Minus, tag("-")),
        value(Token::Star, tag("*")),
        value(Token::Slash, tag("/")),
        value(Token::Pipe, tag("|")),
        value(Token::Caret, tag("^")),
        value(Token::Ampersand, tag("&")),
        value(Token::Tilde, tag("~")),
        value(Token::Equal, tag("=")),
        value(Token::Less, tag("<")),
        value(Token::Greater, tag(">")),
    ))(input)
}

fn word(text: &str) -> Token {
    match text {
        "func" => Token::Func,
        "begin" => Token::Begin,
        "end" => Token::End,
        "var" => Token::Var,
        "return" => Token::Return,
        "print" => Token::Print,
        "continue" => Token::Continue,
        "if" => Token::If,
        "then" => Token::Then,
        "else" => Token::Else,
        "while" => Token::While,
        "do" => Token::Do,
        name => Token::Identifier(name.to_string()),
    }
}

/// Binary operators from loosest to tightest binding.
const PRECEDENCE: &[&[(Token, Operator)]] = &[
    &[(Token::Pipe, Operator::Or)],
    &[(Token::Caret, Operator::Xor)],
    &[(Token::Ampersand, Operator::And)],
    &[(Token::Plus, Operator::Add), (Token::Minus, Operator::Subtract)],
    &[(Token::Star, Operator::Multiply), (Token::Slash, Operator::Divide)],
];

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    tree: Tree,
}

type ParserResult<T> = Result<T, String>;

pub fn parse(tokens: Vec<Token>) -> ParserResult<Tree> {
    debug!("Input: {:?}", tokens);
    Parser::new(tokens).parse()
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens,
            position: 0,
            tree: Tree::new(),
        }
    }

    fn parse(mut self) -> ParserResult<Tree> {
        debug!("parse()");
        let mut globals = vec![];
        while !self.empty() {
            globals.push(self.parse_global()?);
        }
        if globals.is_empty() {
            return Err("Expected at least one global declaration".to_string());
        }
        let global_list = self.node(NodeKind::GlobalList, NodeData::None, globals);
        let program = self.node(NodeKind::Program, NodeData::None, vec![global_list]);
        self.tree.set_root(program);
        Ok(self.tree)
    }

    fn parse_global(&mut self) -> ParserResult<NodeId> {
        debug!("parse_global()");
        match self.peek()?.clone() {
            Token::Func => self.parse_function(),
            Token::Var => self.parse_declaration(),
            token => self.error_expected_one_of(token, &vec![Token::Func, Token::Var]),
        }
    }

    fn parse_function(&mut self) -> ParserResult<NodeId> {
        debug!("parse_function()");
        self.skip(&Token::Func)?;
        let name = self.parse_identifier()?;
        self.skip(&Token::OpenParen)?;
        let params = self.separated_with_until(
            Parser::parse_identifier,
            Token::Comma,
            Token::CloseParen,
        )?;
        let parameters = self.node(NodeKind::VariableList, NodeData::None, params);
        let body = self.parse_statement()?;
        Ok(self.node(NodeKind::Function, NodeData::None, vec![name, parameters, body]))
    }

    fn parse_declaration(&mut self) -> ParserResult<NodeId> {
        debug!("parse_declaration()");
        self.skip(&Token::Var)?;
        let mut names = vec![self.parse_identifier()?];
        while self.peek_for(&Token::Comma) {
            self.skip(&Token::Comma)?;
            names.push(self.parse_identifier()?);
        }
        let variables = self.node(NodeKind::VariableList, NodeData::None, names);
        Ok(self.node(NodeKind::Declaration, NodeData::None, vec![variables]))
    }

    fn parse_statement(&mut self) -> ParserResult<NodeId> {
        debug!("parse_statement()");
        match self.peek()?.clone() {
            Token::Identifier(_) => self.parse_assignment(),
            Token::Return => self.parse_return(),
            Token::Print => self.parse_print(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::Continue => {
                self.skip(&Token::Continue)?;
                Ok(self.node(NodeKind::Null, NodeData::None, vec![]))
            },
            Token::Begin => self.parse_block(),
            token => self.error(token),
        }
    }

    fn parse_block(&mut self) -> ParserResult<NodeId> {
        debug!("parse_block()");
        self.skip(&Token::Begin)?;
        let mut declarations = vec![];
        while self.peek_for(&Token::Var) {
            declarations.push(self.parse_declaration()?);
        }
        let mut statements = vec![];
        while !self.peek_for(&Token::End) {
            statements.push(self.parse_statement()?);
        }
        self.skip(&Token::End)?;

        let mut children = vec![];
        if !declarations.is_empty() {
            children.push(self.node(NodeKind::DeclarationList, NodeData::None, declarations));
        }
        children.push(self.node(NodeKind::StatementList, NodeData::None, statements));
        Ok(self.node(NodeKind::Block, NodeData::None, children))
    }

    fn parse_assignment(&mut self) -> ParserResult<NodeId> {
        debug!("parse_assignment()");
        let target = self.parse_identifier()?;
        self.skip(&Token::Assign)?;
        let expression = self.parse_expression()?;
        Ok(self.node(NodeKind::Assignment, NodeData::None, vec![target, expression]))
    }

    fn parse_return(&mut self) -> ParserResult<NodeId> {
        self.skip(&Token::Return)?;
        let expression = self.parse_expression()?;
        Ok(self.node(NodeKind::Return, NodeData::None, vec![expression]))
    }

    fn parse_print(&mut self) -> ParserResult<NodeId> {
        debug!("parse_print()");
        self.skip(&Token::Print)?;
        let mut items = vec![self.parse_print_item()?];
        while self.peek_for(&Token::Comma) {
            self.skip(&Token::Comma)?;
            items.push(self.parse_print_item()?);
        }
        let list = self.node(NodeKind::PrintList, NodeData::None, items);
        Ok(self.node(NodeKind::Print, NodeData::None, vec![list]))
    }

    fn parse_print_item(&mut self) -> ParserResult<NodeId> {
        let is_string = matches!(self.peek()?, Token::StringLiteral(_));
        if is_string {
            self.parse_string_literal()
        } else {
            self.parse_expression()
        }
    }

    fn parse_if(&mut self) -> ParserResult<NodeId> {
        debug!("parse_if()");
        self.skip(&Token::If)?;
        let mut children = vec![self.parse_relation()?];
        self.skip(&Token::Then)?;
        children.push(self.parse_statement()?);
        if self.peek_for(&Token::Else) {
            self.skip(&Token::Else)?;
            children.push(self.parse_statement()?);
        }
        Ok(self.node(NodeKind::If, NodeData::None, children))
    }

    fn parse_while(&mut self) -> ParserResult<NodeId> {
        debug!("parse_while()");
        self.skip(&Token::While)?;
        let relation = self.parse_relation()?;
        self.skip(&Token::Do)?;
        let body = self.parse_statement()?;
        Ok(self.node(NodeKind::While, NodeData::None, vec![relation, body]))
    }

    fn parse_relation(&mut self) -> ParserResult<NodeId> {
        debug!("parse_relation()");
        let left = self.parse_expression()?;
        let operator = match self.consume()? {
            Token::Equal => Operator::Equal,
            Token::Less => Operator::Less,
            Token::Greater => Operator::Greater,
            token => {
                return self.error_expected_one_of(
                    token,
                    &vec![Token::Equal, Token::Less, Token::Greater],
                )
            },
        };
        let right = self.parse_expression()?;
        Ok(self.node(NodeKind::Relation, NodeData::Operator(operator), vec![left, right]))
    }

    fn parse_expression(&mut self) -> ParserResult<NodeId> {
        debug!("parse_expression()");
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, level: usize) -> ParserResult<NodeId> {
        if level == PRECEDENCE.len() {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level + 1)?;
        loop {
            let operator = PRECEDENCE[level]
                .iter()
                .find(|&&(ref token, _)| self.peek_for(token))
                .map(|&(_, operator)| operator);
            match operator {
                Some(operator) => {
                    self.consume()?;
                    let right = self.parse_binary(level + 1)?;
                    left = self.node(
                        NodeKind::Expression,
                        NodeData::Operator(operator),
                        vec![left, right],
                    );
                },
                None => return Ok(left),
            }
        }
    }

    fn parse_unary(&mut self) -> ParserResult<NodeId> {
        let operator = match self.peek()?.clone() {
            Token::Minus => Operator::Negate,
            Token::Tilde => Operator::Not,
            _ => return self.parse_primary(),
        };
        self.consume()?;
        let operand = self.parse_unary()?;
        Ok(self.node(NodeKind::Expression, NodeData::Operator(operator), vec![operand]))
    }

    fn parse_primary(&mut self) -> ParserResult<NodeId> {
        debug!("parse_primary()");
        match self.peek()?.clone() {
            Token::OpenParen => {
                self.skip(&Token::OpenParen)?;
                let inner = self.parse_expression()?;
                self.skip(&Token::CloseParen)?;
                Ok(inner)
            },
            Token::Number(n) => {
                self.consume()?;
                Ok(self.node(NodeKind::Number, NodeData::Number(n), vec![]))
            },
            Token::Identifier(_) => {
                if self.peek_nth_for(1, &Token::OpenParen) {
                    self.parse_function_call()
                } else {
                    self.parse_identifier()
                }
            },
            token => self.error(token),
        }
    }

    fn parse_function_call(&mut self) -> ParserResult<NodeId> {
        debug!("parse_function_call()");
        let name = self.parse_identifier()?;
        self.skip(&Token::OpenParen)?;
        let args = self.separated_with_until(
            Parser::parse_expression,
            Token::Comma,
            Token::CloseParen,
        )?;
        let arguments = self.node(NodeKind::ArgumentList, NodeData::None, args);
        Ok(self.node(NodeKind::Expression, NodeData::None, vec![name, arguments]))
    }

    fn parse_identifier(&mut self) -> ParserResult<NodeId> {
        debug!("parse_identifier()");
        match self.consume()? {
            Token::Identifier(name) => {
                Ok(self.node(NodeKind::Identifier, NodeData::Name(name), vec![]))
            },
            token => self.error(token),
        }
    }

    fn parse_string_literal(&mut self) -> ParserResult<NodeId> {
        match self.consume()? {
            Token::StringLiteral(text) => {
                Ok(self.node(NodeKind::StringLiteral, NodeData::Text(text), vec![]))
            },
            token => self.error(token),
        }
    }

    fn node(&mut self, kind: NodeKind, data: NodeData, children: Vec<NodeId>) -> NodeId {
        self.tree.push(Node::new(kind, data, children))
    }

    fn consume(&mut self) -> ParserResult<Token> {
        if self.empty() {
            return Err("EOF".to_string());
        }
        let t = self.tokens[self.position].clone();
        self.position += 1;
        debug!("Consume: {:?}", t);
        Ok(t)
    }

    fn peek(&self) -> ParserResult<&Token> {
        if self.empty() {
            return Err("EOF".to_string());
        }
        let t = &self.tokens[self.position];
        debug!("Peek: {:?}", t);
        Ok(t)
    }

    fn peek_for(&self, t: &Token) -> bool {
        self.peek()
            .map(|peeked| peeked == t)
            .unwrap_or(false)
    }

    fn peek_nth_for(&self, n: usize, t: &Token) -> bool {
        self.tokens.get(self.position + n)
            .map(|peeked| peeked == t)
            .unwrap_or(false)
    }

    fn skip(&mut self, t: &Token) -> ParserResult<()> {
        debug!("skip({:?})", t);
        if self.peek_for(t) {
            self.consume()?;
            Ok(())
        } else {
            let found = self.peek()?.clone();
            self.error_expected(found, t.clone())
        }
    }

    fn separated_with_until<F, T>(&mut self, f: F, sep: Token, end: Token) -> ParserResult<Vec<T>>
        where F: Fn(&mut Parser) -> ParserResult<T>
    {
        debug!("separated_with_until({:?}, {:?})", sep, end);
        let mut v = vec![];
        loop {
            if self.peek_for(&end) {
                self.consume()?;
                return Ok(v);
            }
            v.push(f(self)?);
            if self.peek_for(&end) {
                self.consume()?;
                return Ok(v);
            }
            self.skip(&sep)?;
        }
    }

    fn error<T>(&self, token: Token) -> ParserResult<T> {
        Err(format!("Unexpected token: {:?}", token))
    }

    fn error_expected<T>(&self, found: Token, expected: Token) -> ParserResult<T> {
        Err(format!("Expecting {:?}, found {:?}", expected, found))
    }

    fn error_expected_one_of<T>(&self, found: Token, expected: &Vec<Token>) -> ParserResult<T> {
        Err(format!("Expecting one of {:?}, found {:?}", expected, found))
    }

    fn empty(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

#[cfg(test)]
fn parse_str(input: &str) -> Tree {
    let (_, tokens) = lex(input).unwrap();
    parse(tokens).unwrap()
}

#[test]
fn test_lex_keywords_and_identifiers() {
    let (_, tokens) = lex("func variable(a) begin var x end").unwrap();
    assert_eq!(tokens, vec![
        Token::Func,
        Token::Identifier("variable".to_string()),
        Token::OpenParen,
        Token::Identifier("a".to_string()),
        Token::CloseParen,
        Token::Begin,
        Token::Var,
        Token::Identifier("x".to_string()),
        Token::End,
    ]);
}

#[test]
fn test_lex_literals_and_comments() {
    let (_, tokens) = lex("print \"hi\", 42 // trailing\nx := -1").unwrap();
    assert_eq!(tokens, vec![
        Token::Print,
        Token::StringLiteral("hi".to_string()),
        Token::Comma,
        Token::Number(42),
        Token::Identifier("x".to_string()),
        Token::Assign,
        Token::Minus,
        Token::Number(1),
    ]);
}

#[test]
fn test_lex_rejects_stray_characters() {
    assert!(lex("var x; ").is_err());
}

#[test]
fn test_simple_global_declaration() {
    let tree = parse_str("var x, y");
    assert_eq!(
        tree.dump(),
        "PROGRAM\n GLOBAL_LIST\n  DECLARATION\n   VARIABLE_LIST\n    IDENTIFIER_DATA(x)\n    IDENTIFIER_DATA(y)\n"
    );
}

#[test]
fn test_function_shape() {
    let tree = parse_str("func f(a, b) begin return a end");
    let root = tree.root().unwrap();
    let globals = tree[root].children[0];
    let function = &tree[tree[globals].children[0]];
    assert_eq!(function.kind, NodeKind::Function);
    assert_eq!(function.children.len(), 3);
    assert_eq!(tree[function.children[0]].name(), Some("f"));
    assert_eq!(tree[function.children[1]].children.len(), 2);
    assert_eq!(tree[function.children[2]].kind, NodeKind::Block);
}

#[test]
fn test_block_with_declarations() {
    let tree = parse_str("func main() begin var y y := x end");
    assert_eq!(
        tree.dump(),
        "PROGRAM\n GLOBAL_LIST\n  FUNCTION\n   IDENTIFIER_DATA(main)\n   VARIABLE_LIST\n   BLOCK\n    DECLARATION_LIST\n     DECLARATION\n      VARIABLE_LIST\n       IDENTIFIER_DATA(y)\n    STATEMENT_LIST\n     ASSIGNMENT_STATEMENT\n      IDENTIFIER_DATA(y)\n      IDENTIFIER_DATA(x)\n"
    );
}

#[test]
fn test_expression_precedence() {
    let tree = parse_str("func f() return 1 + 2 * -3");
    assert_eq!(
        tree.dump(),
        "PROGRAM\n GLOBAL_LIST\n  FUNCTION\n   IDENTIFIER_DATA(f)\n   VARIABLE_LIST\n   RETURN_STATEMENT\n    EXPRESSION(+)\n     NUMBER_DATA(1)\n     EXPRESSION(*)\n      NUMBER_DATA(2)\n      EXPRESSION(-)\n       NUMBER_DATA(3)\n"
    );
}

#[test]
fn test_function_call_and_control_flow() {
    let tree = parse_str("
        func main()
        begin
            if f(1) > 0 then print \"yes\" else continue
            while x < 10 do x := x + 1
        end
    ");
    let dump = tree.dump();
    assert!(dump.contains("EXPRESSION\n        IDENTIFIER_DATA(f)\n        ARGUMENT_LIST\n         NUMBER_DATA(1)\n"));
    assert!(dump.contains("IF_STATEMENT"));
    assert!(dump.contains("STRING_DATA(\"yes\")"));
    assert!(dump.contains("NULL_STATEMENT"));
    assert!(dump.contains("WHILE_STATEMENT"));
}

#[test]
fn test_parse_errors() {
    let (_, tokens) = lex("func f( begin end").unwrap();
    assert!(parse(tokens).is_err());
    let (_, tokens) = lex("x := 1").unwrap();
    assert!(parse(tokens).is_err());
    assert!(parse(vec![]).is_err());
}
