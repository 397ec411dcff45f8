pub mod diamond;
pub mod inventory;
pub mod mount;
pub mod order;
pub mod order_detail;
pub mod product;
pub mod product_diamond;
pub mod product_price;
pub mod product_promotion;
pub mod promotion;
pub mod user;
pub mod voucher;
