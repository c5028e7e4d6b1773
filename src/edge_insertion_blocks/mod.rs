pub mod dual_router;
