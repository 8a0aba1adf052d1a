//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

use treewright::core::diff::unified_diff;
use treewright::core::text::{offset_to_position, position_to_offset, Position};
use treewright::core::{Marker, MarkerKind, Markers, NodeId};
use treewright::error::{OutputErrorCode, TreewrightError};
use treewright::logging::{init_tracing, try_init_tracing, LogLevel};
use treewright::{MarkerPrinting, RunConfig};

// ============================================================================
// Tree Types
// ============================================================================

use treewright::lst::cursor::Cursor;
use treewright::lst::parser::{JavaParser, ParserOptions, JDK_STUBS};
use treewright::lst::rpc::{RpcBatch, RpcEvent, TreeReceiver, TreeSender};
use treewright::lst::types::{ClassKind, ClassType, MethodType, PrimitiveKind, VariableType};
use treewright::lst::visitor::{collect, find_all, IsoVisitor, TreeVisitor, VisitResult};
use treewright::lst::{
    Codegen, CodegenState, Comment, CommentStyle, CompilationUnit, Container, CursorError,
    JavaType, LeftPadded, ParseError, PrintOptions, RightPadded, RpcError, Space, Tree, TreeKind,
    TypeId, TypeOracle, TypeTable, TypeTableBuilder,
};

// ============================================================================
// Analysis Types
// ============================================================================

use treewright::analysis::{
    AnnotationMatcher, Escape, EscapeAnalysis, EscapeKind, FlowMode, FlowPath, FlowResult,
    FlowState, LocalFlow, LocalFlowSpec, MethodMatcher, PatternError, TypeMatcher,
};

// ============================================================================
// Recipe Types
// ============================================================================

use treewright::recipe::search::{
    FindAnnotations, FindLeakingLocals, FindMethods, FindMissingTypes, FindTypes,
};
use treewright::recipe::{
    ExecutionContext, MarkFilesInModulesContaining, Recipe, RecipeError, RecipeResult,
    RecipeRunner, RecipeVisitor, RunResult, ScanningRecipe, SourceError, SourceFile,
};

#[test]
fn api_surface_compiles() {
    // If this test compiles, the public API surface is intact.
}
