mod lqr;
